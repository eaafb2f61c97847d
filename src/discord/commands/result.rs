use poise::serenity_prelude::{ChannelId, CreateMessage, GuildId, Http, Mentionable, UserId};
use tracing::{error, info, instrument, warn};

use crate::db::{NewResult, Repository};
use crate::discord::bot::{Context, Data, author_role_names, require_guild};
use crate::discord::{embeds, guild};
use crate::error::AppError;
use crate::tierlist::{
    PlayerProfile, ResultCooldown, SessionBook, SessionId, TestSession, Tier, TierResult,
    TierlistError,
};

/// The given session, or the caller's only active one.
async fn resolve_session_id(
    sessions: &SessionBook,
    tester: UserId,
    session: Option<u64>,
) -> Result<SessionId, TierlistError> {
    if let Some(id) = session {
        return Ok(SessionId(id));
    }

    match sessions.active_for(tester).await.as_slice() {
        [] => Err(TierlistError::NoOpenSession),
        [only] => Ok(only.id),
        open => Err(TierlistError::SessionIdRequired(open.len())),
    }
}

/// Closes `pending` with `tier`, stores the result and returns it with the
/// player's previous tier.
///
/// The submitter's cooldown slot and the session are only consumed once the
/// result is in the log; any failure puts both back.
async fn commit_result(
    db: &Repository,
    sessions: &SessionBook,
    cooldown: &ResultCooldown,
    pending: &TestSession,
    submitter: UserId,
    tier: Tier,
    ign: &str,
) -> Result<(TierResult, Tier), AppError> {
    let previous = db
        .current_tier(pending.candidate.get(), pending.gamemode)
        .await?;
    cooldown.check(submitter)?;

    let outcome = match sessions.resolve(pending.id, tier).await {
        Ok(outcome) => outcome,
        Err(e) => {
            cooldown.release(submitter);
            return Err(e.into());
        }
    };

    let stored = db
        .record_result(&NewResult {
            tester_id: submitter.get(),
            player_id: outcome.candidate.get(),
            ign,
            gamemode: outcome.gamemode.display_name(),
            region: outcome.region.as_str(),
            previous_tier: previous,
            new_tier: outcome.tier,
            recorded_at: outcome.recorded_at,
        })
        .await;

    if let Err(e) = stored {
        error!(error = %e, session_id = %pending.id, "🏆 ❌ Failed to store tier result");
        sessions.restore(pending.clone()).await;
        cooldown.release(submitter);
        return Err(e);
    }

    Ok((outcome, previous))
}

/// Submit the tier earned in a test session
#[poise::command(slash_command, guild_only)]
#[instrument(skip(ctx), fields(user_id = %ctx.author().id))]
pub async fn result(
    ctx: Context<'_>,
    #[description = "Tier earned"] tier: Tier,
    #[description = "Session id (defaults to your only open session)"] session: Option<u64>,
) -> Result<(), AppError> {
    let guild_id = require_guild(ctx)?;
    let data = ctx.data();
    let tester = ctx.author().id;

    let id = resolve_session_id(&data.sessions, tester, session).await?;
    let pending = data.sessions.get(id).await?;

    let roles = author_role_names(ctx).await?;
    if !data.roles.can_submit_result(&roles, pending.gamemode) {
        return Err(TierlistError::MissingRole(pending.gamemode.tester_role_name()).into());
    }

    ctx.defer_ephemeral().await?;

    let profile = data.db.get_profile(pending.candidate.get()).await?;
    let ign = profile.as_ref().map_or("unknown", |p| p.ign.as_str());

    let (outcome, previous) = commit_result(
        &data.db,
        &data.sessions,
        &data.cooldown,
        &pending,
        tester,
        tier,
        ign,
    )
    .await?;

    let change = data.roles.role_change(outcome.gamemode, previous, outcome.tier);
    if let Err(e) = guild::apply_role_change(ctx.http(), guild_id, outcome.candidate, &change).await {
        warn!(error = %e, candidate = %outcome.candidate, "🏷️ ⚠️ Failed to update tier roles");
    }

    if let Some(profile) = &profile {
        announce_result(ctx.http(), data, guild_id, profile, &pending, &outcome, previous).await;
    }

    info!(
        session_id = %id,
        candidate = %outcome.candidate,
        %previous,
        awarded = %outcome.tier,
        "🏆 Tier result recorded"
    );

    ctx.send(
        poise::CreateReply::default()
            .content(format!(
                "✅ {} is now **{}** in {} (was {}).",
                outcome.candidate.mention(),
                outcome.tier,
                outcome.gamemode,
                previous
            ))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

async fn announce_result(
    http: &Http,
    data: &Data,
    guild_id: GuildId,
    profile: &PlayerProfile,
    session: &TestSession,
    outcome: &TierResult,
    previous: Tier,
) {
    let channel_id = match results_channel(http, data, guild_id).await {
        Ok(Some(channel_id)) => channel_id,
        Ok(None) => {
            warn!(
                channel = %data.config.results_channel_name,
                "🏆 ⚠️ No results channel configured or found"
            );
            return;
        }
        Err(e) => {
            error!(error = ?e, "🏆 ❌ Failed to resolve results channel");
            return;
        }
    };

    let avatar = data.mojang.avatar_for(profile).await;
    let embed =
        embeds::result_embed(profile, outcome.tester, session, previous, outcome.tier, &avatar);

    if let Err(e) = channel_id
        .send_message(http, CreateMessage::new().embed(embed))
        .await
    {
        error!(error = %e, %channel_id, "🏆 ❌ Failed to post tier result");
    }
}

async fn results_channel(
    http: &Http,
    data: &Data,
    guild_id: GuildId,
) -> Result<Option<ChannelId>, AppError> {
    let configured = data
        .db
        .get_guild(guild_id.get())
        .await?
        .and_then(|guild| guild.results_channel_id)
        .map(|id| ChannelId::new(id as u64));
    if configured.is_some() {
        return Ok(configured);
    }

    Ok(
        guild::find_text_channel(http, guild_id, &data.config.results_channel_name)
            .await?
            .map(|channel| channel.id),
    )
}

/// Drop a test session without a result
#[poise::command(slash_command, guild_only)]
#[instrument(skip(ctx), fields(user_id = %ctx.author().id))]
pub async fn abandon(
    ctx: Context<'_>,
    #[description = "Session id (defaults to your only open session)"] session: Option<u64>,
) -> Result<(), AppError> {
    let data = ctx.data();
    let tester = ctx.author().id;
    let id = resolve_session_id(&data.sessions, tester, session).await?;

    let pending = data.sessions.get(id).await?;
    if pending.tester != tester {
        let roles = author_role_names(ctx).await?;
        if !data.roles.is_admin(&roles) {
            return Err(TierlistError::SessionNotFound(id).into());
        }
    }

    let abandoned = data.sessions.abandon(id).await?;

    ctx.send(
        poise::CreateReply::default()
            .content(format!(
                "🗑️ Session `{id}` with {} was abandoned. They are not re-queued.",
                abandoned.candidate.mention()
            ))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sqlx::SqlitePool;

    use super::*;
    use crate::db::{connect, run_migrations};
    use crate::tierlist::{Gamemode, QueueKey, Region};

    async fn pool() -> SqlitePool {
        let pool = connect("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    async fn paired(sessions: &SessionBook) -> TestSession {
        sessions
            .pair(
                QueueKey::new(Gamemode::Sword, Region::Eu),
                UserId::new(100),
                UserId::new(1),
            )
            .await
    }

    #[tokio::test]
    async fn committed_result_is_stored_and_starts_cooldown() {
        let db = Repository::new(pool().await);
        let sessions = SessionBook::new();
        let cooldown = ResultCooldown::new(Duration::from_secs(30));
        let pending = paired(&sessions).await;

        let (outcome, previous) = commit_result(
            &db, &sessions, &cooldown, &pending, pending.tester, Tier::Ht3, "Dream",
        )
        .await
        .unwrap();

        assert_eq!(outcome.tier, Tier::Ht3);
        assert_eq!(previous, Tier::Unranked);
        assert_eq!(
            db.current_tier(1, Gamemode::Sword).await.unwrap(),
            Tier::Ht3
        );
        assert!(sessions.get(pending.id).await.is_err());

        let other = paired(&sessions).await;
        let again = commit_result(
            &db, &sessions, &cooldown, &other, other.tester, Tier::Lt2, "Dream",
        )
        .await;
        assert!(matches!(
            again,
            Err(AppError::Tierlist(TierlistError::OnCooldown { .. }))
        ));
        assert!(sessions.get(other.id).await.is_ok());
    }

    #[tokio::test]
    async fn failed_write_keeps_session_and_cooldown() {
        let pool = pool().await;
        let db = Repository::new(pool.clone());
        let sessions = SessionBook::new();
        let cooldown = ResultCooldown::new(Duration::from_secs(30));
        let pending = paired(&sessions).await;

        sqlx::query(
            "CREATE TRIGGER reject_results BEFORE INSERT ON tier_results \
             BEGIN SELECT RAISE(ABORT, 'disk full'); END",
        )
        .execute(&pool)
        .await
        .unwrap();

        let failed = commit_result(
            &db, &sessions, &cooldown, &pending, pending.tester, Tier::Ht3, "Dream",
        )
        .await;

        assert!(failed.is_err());
        assert_eq!(
            sessions.get(pending.id).await.unwrap().candidate,
            UserId::new(1)
        );
        assert!(cooldown.check(UserId::new(100)).is_ok());
    }

    #[tokio::test]
    async fn closed_session_gives_the_cooldown_back() {
        let db = Repository::new(pool().await);
        let sessions = SessionBook::new();
        let cooldown = ResultCooldown::new(Duration::from_secs(30));
        let pending = paired(&sessions).await;
        sessions.abandon(pending.id).await.unwrap();

        let failed = commit_result(
            &db, &sessions, &cooldown, &pending, pending.tester, Tier::Ht3, "Dream",
        )
        .await;

        assert!(matches!(
            failed,
            Err(AppError::Tierlist(TierlistError::SessionNotFound(_)))
        ));
        assert!(cooldown.check(UserId::new(100)).is_ok());
    }

    #[tokio::test]
    async fn session_id_defaults_to_the_only_open_one() {
        let sessions = SessionBook::new();
        let tester = UserId::new(100);

        assert_eq!(
            resolve_session_id(&sessions, tester, None).await,
            Err(TierlistError::NoOpenSession)
        );

        let first = paired(&sessions).await;
        assert_eq!(resolve_session_id(&sessions, tester, None).await, Ok(first.id));

        paired(&sessions).await;
        assert_eq!(
            resolve_session_id(&sessions, tester, None).await,
            Err(TierlistError::SessionIdRequired(2))
        );
        assert_eq!(
            resolve_session_id(&sessions, tester, Some(7)).await,
            Ok(SessionId(7))
        );
    }
}
