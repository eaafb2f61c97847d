use poise::serenity_prelude::{CreateMessage, GuildChannel, GuildId, Mentionable};
use tracing::{info, instrument, warn};

use crate::discord::bot::{Context, author_role_names, require_guild};
use crate::discord::{embeds, guild, panel};
use crate::error::AppError;
use crate::tierlist::{
    AccountType, Gamemode, PlayerProfile, QueueKey, Region, TestSession, TierlistError,
};

async fn require_tester(ctx: Context<'_>, gamemode: Gamemode) -> Result<(), AppError> {
    let tester_role = gamemode.tester_role_name();
    if author_role_names(ctx).await?.contains(&tester_role) {
        Ok(())
    } else {
        Err(TierlistError::MissingRole(tester_role).into())
    }
}

/// Open a queue and go active as a tester
#[poise::command(slash_command, guild_only)]
#[instrument(skip(ctx), fields(user_id = %ctx.author().id))]
pub async fn start(
    ctx: Context<'_>,
    #[description = "Gamemode to test"] gamemode: Gamemode,
    #[description = "Region to test"] region: Region,
) -> Result<(), AppError> {
    let guild_id = require_guild(ctx)?;
    require_tester(ctx, gamemode).await?;

    let key = QueueKey::new(gamemode, region);
    let data = ctx.data();
    data.queues.open(key, ctx.author().id).await?;
    info!(?key, "🎮 Tester went active");

    ctx.defer_ephemeral().await?;
    panel::publish(ctx.http(), &data.queues, guild_id, key, true).await?;

    ctx.send(
        poise::CreateReply::default()
            .content(format!("✅ You are now testing **{gamemode}** ({region})."))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

/// Go inactive as a tester; the queue closes when the last tester leaves
#[poise::command(slash_command, guild_only)]
#[instrument(skip(ctx), fields(user_id = %ctx.author().id))]
pub async fn stop(
    ctx: Context<'_>,
    #[description = "Gamemode you are testing"] gamemode: Gamemode,
    #[description = "Region you are testing"] region: Region,
) -> Result<(), AppError> {
    let key = QueueKey::new(gamemode, region);
    let data = ctx.data();
    let closed = data.queues.close(key, ctx.author().id).await?;
    panel::refresh(ctx.http(), &data.queues, key).await;

    let content = if closed {
        info!(?key, "🎮 Queue closed, waiting list cleared");
        format!("🔒 The **{gamemode}** queue ({region}) is now closed.")
    } else {
        info!(?key, "🎮 Tester went inactive");
        format!("✅ You stopped testing **{gamemode}** ({region}).")
    };

    ctx.send(poise::CreateReply::default().content(content).ephemeral(true))
        .await?;

    Ok(())
}

/// Pull the next player from the queue into a private ticket
#[poise::command(slash_command, guild_only)]
#[instrument(skip(ctx), fields(user_id = %ctx.author().id))]
pub async fn next(
    ctx: Context<'_>,
    #[description = "Gamemode you are testing"] gamemode: Gamemode,
    #[description = "Region you are testing"] region: Region,
) -> Result<(), AppError> {
    let guild_id = require_guild(ctx)?;
    require_tester(ctx, gamemode).await?;

    let key = QueueKey::new(gamemode, region);
    let data = ctx.data();
    let tester = ctx.author().id;
    if !data.queues.is_tester_active(key, tester).await {
        return Err(TierlistError::TesterNotActive.into());
    }

    ctx.defer_ephemeral().await?;
    let candidate = data.queues.next(key).await?;
    let session = data.sessions.pair(key, tester, candidate).await;

    let channel = match open_ticket(ctx, guild_id, &session).await {
        Ok(channel) => channel,
        Err(e) => {
            if let Err(undo) = data.sessions.unpair(session.id, &data.queues).await {
                warn!(error = %undo, session_id = %session.id, "🎫 ⚠️ Could not undo pairing");
            }
            panel::refresh(ctx.http(), &data.queues, key).await;
            return Err(e);
        }
    };
    panel::refresh(ctx.http(), &data.queues, key).await;

    info!(session_id = %session.id, %candidate, ?key, "🎫 Test session started");

    ctx.send(
        poise::CreateReply::default()
            .content(format!(
                "✅ Created ticket: {} (session `{}`)",
                channel.mention(),
                session.id
            ))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

/// Creates the private ticket of a freshly paired session and greets both sides.
async fn open_ticket(
    ctx: Context<'_>,
    guild_id: GuildId,
    session: &TestSession,
) -> Result<GuildChannel, AppError> {
    let data = ctx.data();
    let http = ctx.http();
    let candidate = session.candidate;

    let profile = match data.db.get_profile(candidate.get()).await? {
        Some(profile) => profile,
        None => {
            warn!(%candidate, "🎫 ⚠️ Queued player has no profile");
            PlayerProfile {
                user_id: candidate,
                ign: "unknown".into(),
                account_type: AccountType::Premium,
                region: session.region,
            }
        }
    };

    let channel = guild::create_ticket_channel(
        http,
        guild_id,
        &guild::ticket_channel_name(session.gamemode.slug(), &profile.ign),
        &[candidate, session.tester, ctx.framework().bot_id],
        data.roles.staff_roles(),
    )
    .await?;
    data.sessions.attach_ticket(session.id, channel.id).await?;

    let greeting = CreateMessage::new()
        .content(format!("{} {}", candidate.mention(), session.tester.mention()))
        .embed(embeds::ticket_embed(session, &profile));
    if let Err(e) = channel.id.send_message(http, greeting).await {
        warn!(error = %e, channel_id = %channel.id, "🎫 ⚠️ Failed to greet ticket");
    }

    Ok(channel)
}

/// Show the status of a queue
#[poise::command(slash_command, guild_only)]
#[instrument(skip(ctx), fields(user_id = %ctx.author().id))]
pub async fn status(
    ctx: Context<'_>,
    #[description = "Gamemode"] gamemode: Gamemode,
    #[description = "Region"] region: Region,
) -> Result<(), AppError> {
    let snapshot = ctx
        .data()
        .queues
        .snapshot(QueueKey::new(gamemode, region))
        .await;

    ctx.send(
        poise::CreateReply::default()
            .embed(embeds::status_embed(&snapshot))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}
