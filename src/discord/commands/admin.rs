use tracing::{info, instrument};

use crate::discord::bot::{Context, author_role_names, require_guild};
use crate::discord::panel;
use crate::error::AppError;
use crate::tierlist::{Gamemode, QueueKey, Region};

async fn is_admin(ctx: Context<'_>) -> Result<bool, AppError> {
    let roles = author_role_names(ctx).await?;
    Ok(ctx.data().roles.is_admin(&roles))
}

/// Queue administration
#[poise::command(
    slash_command,
    guild_only,
    check = "is_admin",
    subcommands("force_open", "force_close", "clear_queue")
)]
pub async fn admin(_ctx: Context<'_>) -> Result<(), AppError> {
    Ok(())
}

/// Open a queue with yourself as tester
#[poise::command(slash_command, guild_only, check = "is_admin", rename = "force_open")]
#[instrument(skip(ctx), fields(user_id = %ctx.author().id))]
pub async fn force_open(
    ctx: Context<'_>,
    #[description = "Gamemode"] gamemode: Gamemode,
    #[description = "Region"] region: Region,
) -> Result<(), AppError> {
    let guild_id = require_guild(ctx)?;
    let key = QueueKey::new(gamemode, region);
    let data = ctx.data();

    data.queues.force_open(key, ctx.author().id).await;
    info!(?key, "🛡️ Queue force-opened");

    ctx.defer_ephemeral().await?;
    panel::publish(ctx.http(), &data.queues, guild_id, key, true).await?;

    ctx.send(
        poise::CreateReply::default()
            .content(format!("✅ Force-opened **{gamemode}** ({region})."))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

/// Close a queue, dropping all testers and waiting players
#[poise::command(slash_command, guild_only, check = "is_admin", rename = "force_close")]
#[instrument(skip(ctx), fields(user_id = %ctx.author().id))]
pub async fn force_close(
    ctx: Context<'_>,
    #[description = "Gamemode"] gamemode: Gamemode,
    #[description = "Region"] region: Region,
) -> Result<(), AppError> {
    let key = QueueKey::new(gamemode, region);
    let data = ctx.data();

    let cleared = data.queues.force_close(key).await;
    info!(?key, cleared, "🛡️ Queue force-closed");
    panel::refresh(ctx.http(), &data.queues, key).await;

    ctx.send(
        poise::CreateReply::default()
            .content(format!(
                "🔒 Force-closed **{gamemode}** ({region}), {cleared} player(s) removed."
            ))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

/// Remove every waiting player from a queue
#[poise::command(slash_command, guild_only, check = "is_admin", rename = "clear_queue")]
#[instrument(skip(ctx), fields(user_id = %ctx.author().id))]
pub async fn clear_queue(
    ctx: Context<'_>,
    #[description = "Gamemode"] gamemode: Gamemode,
    #[description = "Region"] region: Region,
) -> Result<(), AppError> {
    let key = QueueKey::new(gamemode, region);
    let data = ctx.data();

    let cleared = data.queues.clear(key).await;
    info!(?key, cleared, "🛡️ Queue cleared");
    panel::refresh(ctx.http(), &data.queues, key).await;

    ctx.send(
        poise::CreateReply::default()
            .content(format!(
                "🧹 Cleared {cleared} player(s) from **{gamemode}** ({region})."
            ))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}
