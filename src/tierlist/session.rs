//! Test session lifecycle: `Idle -> Paired -> Resolved`, or back to `Idle`
//! when a session is abandoned or times out. Abandoned candidates are never
//! re-queued.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use poise::serenity_prelude::{ChannelId, UserId};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{Gamemode, QueueKey, QueueRegistry, Region, Tier, TierlistError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct TestSession {
    pub id: SessionId,
    pub tester: UserId,
    pub candidate: UserId,
    pub gamemode: Gamemode,
    pub region: Region,
    pub started_at: DateTime<Utc>,
    pub ticket_channel: Option<ChannelId>,
    started: Instant,
}

impl TestSession {
    pub fn key(&self) -> QueueKey {
        QueueKey::new(self.gamemode, self.region)
    }
}

/// Outcome of a resolved session. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierResult {
    pub session_id: SessionId,
    pub tester: UserId,
    pub candidate: UserId,
    pub gamemode: Gamemode,
    pub region: Region,
    pub tier: Tier,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Book {
    next_id: u64,
    active: HashMap<SessionId, TestSession>,
}

#[derive(Debug, Default)]
pub struct SessionBook {
    inner: Mutex<Book>,
}

impl SessionBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs `tester` with a candidate already taken off the queue.
    pub async fn pair(&self, key: QueueKey, tester: UserId, candidate: UserId) -> TestSession {
        let mut book = self.inner.lock().await;
        book.next_id += 1;
        let session = TestSession {
            id: SessionId(book.next_id),
            tester,
            candidate,
            gamemode: key.gamemode,
            region: key.region,
            started_at: Utc::now(),
            ticket_channel: None,
            started: Instant::now(),
        };
        book.active.insert(session.id, session.clone());
        info!(session_id = %session.id, %tester, %candidate, gamemode = %key.gamemode, "🎯 Session paired");
        session
    }

    pub async fn attach_ticket(&self, id: SessionId, channel: ChannelId) -> Result<(), TierlistError> {
        let mut book = self.inner.lock().await;
        let session = book
            .active
            .get_mut(&id)
            .ok_or(TierlistError::SessionNotFound(id))?;
        session.ticket_channel = Some(channel);
        Ok(())
    }

    pub async fn get(&self, id: SessionId) -> Result<TestSession, TierlistError> {
        self.inner
            .lock()
            .await
            .active
            .get(&id)
            .cloned()
            .ok_or(TierlistError::SessionNotFound(id))
    }

    /// Closes the session and produces its result.
    pub async fn resolve(&self, id: SessionId, tier: Tier) -> Result<TierResult, TierlistError> {
        let session = self
            .inner
            .lock()
            .await
            .active
            .remove(&id)
            .ok_or(TierlistError::SessionNotFound(id))?;

        info!(session_id = %id, %tier, candidate = %session.candidate, "🎯 Session resolved");
        Ok(TierResult {
            session_id: id,
            tester: session.tester,
            candidate: session.candidate,
            gamemode: session.gamemode,
            region: session.region,
            tier,
            recorded_at: Utc::now(),
        })
    }

    /// Re-opens a session whose result could not be stored.
    pub async fn restore(&self, session: TestSession) {
        let mut book = self.inner.lock().await;
        warn!(session_id = %session.id, candidate = %session.candidate, "🎯 ⚠️ Session restored");
        book.active.entry(session.id).or_insert(session);
    }

    /// Undoes a pairing that never got going: the session is dropped and the
    /// candidate goes back to the head of their queue.
    pub async fn unpair(&self, id: SessionId, queues: &QueueRegistry) -> Result<(), TierlistError> {
        let session = self
            .inner
            .lock()
            .await
            .active
            .remove(&id)
            .ok_or(TierlistError::SessionNotFound(id))?;
        queues.restore_head(session.key(), session.candidate).await;
        warn!(session_id = %id, candidate = %session.candidate, "🎯 ⚠️ Session unpaired");
        Ok(())
    }

    pub async fn abandon(&self, id: SessionId) -> Result<TestSession, TierlistError> {
        let session = self
            .inner
            .lock()
            .await
            .active
            .remove(&id)
            .ok_or(TierlistError::SessionNotFound(id))?;
        info!(session_id = %id, candidate = %session.candidate, "🎯 Session abandoned");
        Ok(session)
    }

    /// Drops every session that has been paired for longer than `timeout` as of `now`.
    pub async fn reap_expired(&self, now: Instant, timeout: Duration) -> Vec<TestSession> {
        let mut book = self.inner.lock().await;
        let expired: Vec<SessionId> = book
            .active
            .values()
            .filter(|session| now.saturating_duration_since(session.started) >= timeout)
            .map(|session| session.id)
            .collect();

        expired
            .into_iter()
            .filter_map(|id| book.active.remove(&id))
            .collect()
    }

    pub async fn active_for(&self, tester: UserId) -> Vec<TestSession> {
        let book = self.inner.lock().await;
        let mut sessions: Vec<TestSession> = book
            .active
            .values()
            .filter(|session| session.tester == tester)
            .cloned()
            .collect();
        sessions.sort_by_key(|session| session.id);
        sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> QueueKey {
        QueueKey::new(Gamemode::Sword, Region::Na)
    }

    #[tokio::test]
    async fn resolve_produces_result_and_closes_session() {
        let book = SessionBook::new();
        let session = book.pair(key(), UserId::new(100), UserId::new(1)).await;

        let result = book.resolve(session.id, Tier::Ht3).await.unwrap();
        assert_eq!(result.candidate, UserId::new(1));
        assert_eq!(result.tester, UserId::new(100));
        assert_eq!(result.tier, Tier::Ht3);
        assert_eq!(result.gamemode, Gamemode::Sword);

        assert_eq!(
            book.resolve(session.id, Tier::Ht3).await,
            Err(TierlistError::SessionNotFound(session.id))
        );
    }

    #[tokio::test]
    async fn session_ids_are_unique() {
        let book = SessionBook::new();
        let first = book.pair(key(), UserId::new(100), UserId::new(1)).await;
        let second = book.pair(key(), UserId::new(100), UserId::new(2)).await;
        assert_ne!(first.id, second.id);
        assert_eq!(book.active_for(UserId::new(100)).await.len(), 2);
    }

    #[tokio::test]
    async fn abandoned_candidate_is_not_requeued() {
        let registry = QueueRegistry::new();
        let book = SessionBook::new();
        registry.enqueue(key(), UserId::new(1)).await.unwrap();
        registry.enqueue(key(), UserId::new(2)).await.unwrap();

        let candidate = registry.next(key()).await.unwrap();
        let session = book.pair(key(), UserId::new(100), candidate).await;
        let abandoned = book.abandon(session.id).await.unwrap();

        assert_eq!(abandoned.candidate, UserId::new(1));
        assert!(registry.queues_of(UserId::new(1)).await.is_empty());
        assert!(matches!(
            book.get(session.id).await,
            Err(TierlistError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn unpaired_candidate_is_first_in_line_again() {
        let registry = QueueRegistry::new();
        let book = SessionBook::new();
        registry.enqueue(key(), UserId::new(1)).await.unwrap();
        registry.enqueue(key(), UserId::new(2)).await.unwrap();

        let candidate = registry.next(key()).await.unwrap();
        let session = book.pair(key(), UserId::new(100), candidate).await;
        book.unpair(session.id, &registry).await.unwrap();

        assert!(book.active_for(UserId::new(100)).await.is_empty());
        assert_eq!(registry.position(key(), UserId::new(1)).await, Ok(1));
        assert_eq!(
            book.unpair(session.id, &registry).await,
            Err(TierlistError::SessionNotFound(session.id))
        );
    }

    #[tokio::test]
    async fn restored_session_can_be_resolved() {
        let book = SessionBook::new();
        let session = book.pair(key(), UserId::new(100), UserId::new(1)).await;

        book.resolve(session.id, Tier::Lt2).await.unwrap();
        book.restore(session.clone()).await;

        assert_eq!(book.get(session.id).await.unwrap().candidate, UserId::new(1));
        assert!(book.resolve(session.id, Tier::Lt2).await.is_ok());
    }

    #[tokio::test]
    async fn reaps_only_expired_sessions() {
        let book = SessionBook::new();
        let session = book.pair(key(), UserId::new(100), UserId::new(1)).await;
        let timeout = Duration::from_secs(600);

        assert!(book.reap_expired(Instant::now(), timeout).await.is_empty());

        let later = Instant::now() + Duration::from_secs(601);
        let reaped = book.reap_expired(later, timeout).await;
        assert_eq!(reaped.len(), 1);
        assert_eq!(reaped[0].id, session.id);
        assert!(book.active_for(UserId::new(100)).await.is_empty());
    }

    #[tokio::test]
    async fn unknown_session_cannot_get_a_ticket() {
        let book = SessionBook::new();
        assert_eq!(
            book.attach_ticket(SessionId(42), ChannelId::new(9)).await,
            Err(TierlistError::SessionNotFound(SessionId(42)))
        );
    }
}
