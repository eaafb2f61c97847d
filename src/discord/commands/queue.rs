use tracing::instrument;

use crate::discord::bot::{Context, require_guild};
use crate::discord::queueing;
use crate::error::AppError;
use crate::tierlist::{Gamemode, Region};

async fn reply(ctx: Context<'_>, content: String) -> Result<(), AppError> {
    ctx.send(poise::CreateReply::default().content(content).ephemeral(true))
        .await?;
    Ok(())
}

/// Join a gamemode queue
#[poise::command(slash_command, guild_only)]
#[instrument(skip(ctx), fields(user_id = %ctx.author().id))]
pub async fn join(
    ctx: Context<'_>,
    #[description = "Gamemode to be tested in"] gamemode: Gamemode,
    #[description = "Queue region (defaults to your profile's region)"] region: Option<Region>,
) -> Result<(), AppError> {
    let guild_id = require_guild(ctx)?;
    let (key, position) = queueing::join(
        ctx.http(),
        ctx.data(),
        guild_id,
        ctx.author().id,
        gamemode,
        region,
    )
    .await?;

    reply(
        ctx,
        format!(
            "✅ You joined the **{}** queue ({}). Position: **#{position}**",
            key.gamemode, key.region
        ),
    )
    .await
}

/// Leave a gamemode queue
#[poise::command(slash_command, guild_only)]
#[instrument(skip(ctx), fields(user_id = %ctx.author().id))]
pub async fn leave(
    ctx: Context<'_>,
    #[description = "Gamemode queue to leave"] gamemode: Gamemode,
    #[description = "Queue region"] region: Option<Region>,
) -> Result<(), AppError> {
    let key = queueing::leave(ctx.http(), ctx.data(), ctx.author().id, gamemode, region).await?;

    reply(
        ctx,
        format!("✅ You left the **{}** queue ({}).", key.gamemode, key.region),
    )
    .await
}

/// Show your position in a gamemode queue
#[poise::command(slash_command, guild_only)]
#[instrument(skip(ctx), fields(user_id = %ctx.author().id))]
pub async fn position(
    ctx: Context<'_>,
    #[description = "Gamemode queue"] gamemode: Gamemode,
    #[description = "Queue region"] region: Option<Region>,
) -> Result<(), AppError> {
    let data = ctx.data();
    let user_id = ctx.author().id;
    let key = queueing::locate(&data.queues, user_id, gamemode, region).await?;
    let position = data.queues.position(key, user_id).await?;
    let waiting = data.queues.snapshot(key).await.waiting.len();

    reply(
        ctx,
        format!(
            "📋 You are **#{position}** of {waiting} in the **{}** queue ({}).",
            key.gamemode, key.region
        ),
    )
    .await
}
