//! Join/leave flow shared by the slash commands and the panel buttons.

use poise::serenity_prelude::{GuildId, Http, UserId};
use tracing::info;

use super::{Data, guild, panel};
use crate::db::Repository;
use crate::error::AppError;
use crate::tierlist::{Gamemode, QueueKey, QueueRegistry, Region, TierlistError};

/// Admits `user_id` to a gamemode queue. Without an explicit region the
/// player's registered region is used. Returns the key and 1-based position.
pub async fn join(
    http: &Http,
    data: &Data,
    guild_id: GuildId,
    user_id: UserId,
    gamemode: Gamemode,
    region: Option<Region>,
) -> Result<(QueueKey, usize), AppError> {
    let roles = guild::user_role_names(http, guild_id, user_id).await?;
    let (key, position) = admit(&data.db, &data.queues, user_id, &roles, gamemode, region).await?;

    panel::refresh(http, &data.queues, key).await;
    Ok((key, position))
}

/// Checks, in order: registered profile, waitlist role, open queue.
async fn admit(
    db: &Repository,
    queues: &QueueRegistry,
    user_id: UserId,
    member_roles: &[String],
    gamemode: Gamemode,
    region: Option<Region>,
) -> Result<(QueueKey, usize), AppError> {
    let profile = db
        .get_profile(user_id.get())
        .await?
        .ok_or(TierlistError::NotRegistered)?;

    let waitlist_role = gamemode.waitlist_role_name();
    if !member_roles.contains(&waitlist_role) {
        return Err(TierlistError::MissingRole(waitlist_role).into());
    }

    let key = QueueKey::new(gamemode, region.unwrap_or(profile.region));
    if !queues.is_open(key).await {
        return Err(TierlistError::QueueClosed.into());
    }

    let position = queues.enqueue(key, user_id).await?;
    info!(%user_id, ?key, position, "📋 Player joined queue");
    Ok((key, position))
}

/// Resolves the queue a player is waiting in for `gamemode`.
pub async fn locate(
    queues: &QueueRegistry,
    user_id: UserId,
    gamemode: Gamemode,
    region: Option<Region>,
) -> Result<QueueKey, TierlistError> {
    if let Some(region) = region {
        return Ok(QueueKey::new(gamemode, region));
    }

    queues
        .queues_of(user_id)
        .await
        .into_iter()
        .find(|key| key.gamemode == gamemode)
        .ok_or(TierlistError::NotQueued)
}

pub async fn leave(
    http: &Http,
    data: &Data,
    user_id: UserId,
    gamemode: Gamemode,
    region: Option<Region>,
) -> Result<QueueKey, AppError> {
    let key = locate(&data.queues, user_id, gamemode, region).await?;
    data.queues.dequeue(key, user_id).await?;
    info!(%user_id, ?key, "📋 Player left queue");

    panel::refresh(http, &data.queues, key).await;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{connect, run_migrations};
    use crate::tierlist::{AccountType, PlayerProfile};

    fn player() -> UserId {
        UserId::new(1)
    }

    async fn registered(region: Region) -> Repository {
        let pool = connect("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        let db = Repository::new(pool);
        let profile = PlayerProfile::new(player(), "Dream", AccountType::Premium, region).unwrap();
        db.upsert_profile(&profile).await.unwrap();
        db
    }

    fn waitlisted() -> Vec<String> {
        vec![Gamemode::Sword.waitlist_role_name()]
    }

    async fn open_queue(queues: &QueueRegistry, region: Region) {
        queues
            .open(QueueKey::new(Gamemode::Sword, region), UserId::new(100))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unregistered_player_is_rejected() {
        let pool = connect("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        let db = Repository::new(pool);
        let queues = QueueRegistry::new();
        open_queue(&queues, Region::Na).await;

        let result = admit(&db, &queues, player(), &waitlisted(), Gamemode::Sword, None).await;
        assert!(matches!(
            result,
            Err(AppError::Tierlist(TierlistError::NotRegistered))
        ));
    }

    #[tokio::test]
    async fn waitlist_role_is_required() {
        let db = registered(Region::Na).await;
        let queues = QueueRegistry::new();
        open_queue(&queues, Region::Na).await;

        let result = admit(&db, &queues, player(), &[], Gamemode::Sword, None).await;
        match result {
            Err(AppError::Tierlist(TierlistError::MissingRole(role))) => {
                assert_eq!(role, Gamemode::Sword.waitlist_role_name())
            }
            other => panic!("expected missing role, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn closed_queue_turns_players_away() {
        let db = registered(Region::Na).await;
        let queues = QueueRegistry::new();

        let result = admit(&db, &queues, player(), &waitlisted(), Gamemode::Sword, None).await;
        assert!(matches!(
            result,
            Err(AppError::Tierlist(TierlistError::QueueClosed))
        ));
        assert!(queues.queues_of(player()).await.is_empty());
    }

    #[tokio::test]
    async fn registered_region_is_the_default() {
        let db = registered(Region::Eu).await;
        let queues = QueueRegistry::new();
        open_queue(&queues, Region::Eu).await;

        let (key, position) = admit(&db, &queues, player(), &waitlisted(), Gamemode::Sword, None)
            .await
            .unwrap();
        assert_eq!(key, QueueKey::new(Gamemode::Sword, Region::Eu));
        assert_eq!(position, 1);
    }

    #[tokio::test]
    async fn explicit_region_overrides_the_profile() {
        let db = registered(Region::Eu).await;
        let queues = QueueRegistry::new();
        open_queue(&queues, Region::Na).await;

        let (key, _) = admit(
            &db,
            &queues,
            player(),
            &waitlisted(),
            Gamemode::Sword,
            Some(Region::Na),
        )
        .await
        .unwrap();
        assert_eq!(key.region, Region::Na);
    }

    #[tokio::test]
    async fn locate_finds_the_waiting_queue() {
        let queues = QueueRegistry::new();
        let key = QueueKey::new(Gamemode::Sword, Region::As);
        queues.enqueue(key, player()).await.unwrap();

        assert_eq!(locate(&queues, player(), Gamemode::Sword, None).await, Ok(key));
        assert_eq!(
            locate(&queues, player(), Gamemode::Axe, None).await,
            Err(TierlistError::NotQueued)
        );
        assert_eq!(
            locate(&queues, player(), Gamemode::Axe, Some(Region::Eu)).await,
            Ok(QueueKey::new(Gamemode::Axe, Region::Eu))
        );
    }
}
