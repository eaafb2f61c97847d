//! Per-(gamemode, region) waiting lists.
//!
//! Every queue sits behind its own mutex, so admissions on one queue never
//! wait on another. The key set is closed, so all queues exist from start-up.

use std::collections::VecDeque;

use poise::serenity_prelude::{ChannelId, MessageId, UserId};
use tokio::sync::Mutex;
use tracing::debug;

use super::{Gamemode, Region, TierlistError};

const QUEUE_COUNT: usize = Gamemode::ALL.len() * Region::ALL.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueKey {
    pub gamemode: Gamemode,
    pub region: Region,
}

impl QueueKey {
    pub fn new(gamemode: Gamemode, region: Region) -> Self {
        Self { gamemode, region }
    }

    fn index(&self) -> usize {
        self.gamemode as usize * Region::ALL.len() + self.region as usize
    }
}

/// Public message showing the live queue with Join/Leave buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelMessage {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

#[derive(Debug, Default)]
struct GamemodeQueue {
    waiting: VecDeque<UserId>,
    testers: Vec<UserId>,
    panel: Option<PanelMessage>,
}

impl GamemodeQueue {
    fn position_of(&self, player: UserId) -> Option<usize> {
        self.waiting.iter().position(|id| *id == player)
    }
}

/// Read-only copy of a queue, used for status replies and panel rendering.
#[derive(Debug, Clone)]
pub struct QueueSnapshot {
    pub key: QueueKey,
    pub waiting: Vec<UserId>,
    pub testers: Vec<UserId>,
    pub panel: Option<PanelMessage>,
}

impl QueueSnapshot {
    pub fn is_open(&self) -> bool {
        !self.testers.is_empty()
    }
}

#[derive(Debug)]
pub struct QueueRegistry {
    queues: [Mutex<GamemodeQueue>; QUEUE_COUNT],
}

impl Default for QueueRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueRegistry {
    pub fn new() -> Self {
        Self {
            queues: std::array::from_fn(|_| Mutex::new(GamemodeQueue::default())),
        }
    }

    fn slot(&self, key: QueueKey) -> &Mutex<GamemodeQueue> {
        &self.queues[key.index()]
    }

    /// Appends `player` and returns their 1-based position.
    pub async fn enqueue(&self, key: QueueKey, player: UserId) -> Result<usize, TierlistError> {
        let mut queue = self.slot(key).lock().await;
        if queue.position_of(player).is_some() {
            return Err(TierlistError::AlreadyQueued);
        }
        queue.waiting.push_back(player);
        debug!(?key, %player, len = queue.waiting.len(), "📋 Player enqueued");
        Ok(queue.waiting.len())
    }

    pub async fn dequeue(&self, key: QueueKey, player: UserId) -> Result<(), TierlistError> {
        let mut queue = self.slot(key).lock().await;
        let index = queue.position_of(player).ok_or(TierlistError::NotQueued)?;
        queue.waiting.remove(index);
        debug!(?key, %player, "📋 Player dequeued");
        Ok(())
    }

    /// Pops the oldest waiting player.
    pub async fn next(&self, key: QueueKey) -> Result<UserId, TierlistError> {
        let mut queue = self.slot(key).lock().await;
        queue.waiting.pop_front().ok_or(TierlistError::QueueEmpty)
    }

    /// Puts a player taken by [`next`](Self::next) back at the head. A no-op if
    /// they re-joined in the meantime.
    pub async fn restore_head(&self, key: QueueKey, player: UserId) {
        let mut queue = self.slot(key).lock().await;
        if queue.position_of(player).is_none() {
            queue.waiting.push_front(player);
            debug!(?key, %player, "📋 Player restored to the head of the queue");
        }
    }

    pub async fn position(&self, key: QueueKey, player: UserId) -> Result<usize, TierlistError> {
        let queue = self.slot(key).lock().await;
        queue
            .position_of(player)
            .map(|index| index + 1)
            .ok_or(TierlistError::NotQueued)
    }

    pub async fn is_open(&self, key: QueueKey) -> bool {
        !self.slot(key).lock().await.testers.is_empty()
    }

    pub async fn open(&self, key: QueueKey, tester: UserId) -> Result<(), TierlistError> {
        let mut queue = self.slot(key).lock().await;
        if queue.testers.contains(&tester) {
            return Err(TierlistError::TesterAlreadyActive);
        }
        queue.testers.push(tester);
        Ok(())
    }

    /// Takes `tester` offline. Returns `true` when this closed the queue, in
    /// which case the waiting list has been dropped.
    pub async fn close(&self, key: QueueKey, tester: UserId) -> Result<bool, TierlistError> {
        let mut queue = self.slot(key).lock().await;
        let index = queue
            .testers
            .iter()
            .position(|id| *id == tester)
            .ok_or(TierlistError::TesterNotActive)?;
        queue.testers.remove(index);

        if queue.testers.is_empty() {
            queue.waiting.clear();
            return Ok(true);
        }
        Ok(false)
    }

    pub async fn is_tester_active(&self, key: QueueKey, tester: UserId) -> bool {
        self.slot(key).lock().await.testers.contains(&tester)
    }

    pub async fn force_open(&self, key: QueueKey, tester: UserId) {
        let mut queue = self.slot(key).lock().await;
        if !queue.testers.contains(&tester) {
            queue.testers.push(tester);
        }
    }

    /// Drops every tester and waiting player. Returns how many players were waiting.
    pub async fn force_close(&self, key: QueueKey) -> usize {
        let mut queue = self.slot(key).lock().await;
        queue.testers.clear();
        let cleared = queue.waiting.len();
        queue.waiting.clear();
        cleared
    }

    pub async fn clear(&self, key: QueueKey) -> usize {
        let mut queue = self.slot(key).lock().await;
        let cleared = queue.waiting.len();
        queue.waiting.clear();
        cleared
    }

    pub async fn set_panel(&self, key: QueueKey, panel: PanelMessage) {
        self.slot(key).lock().await.panel = Some(panel);
    }

    pub async fn snapshot(&self, key: QueueKey) -> QueueSnapshot {
        let queue = self.slot(key).lock().await;
        QueueSnapshot {
            key,
            waiting: queue.waiting.iter().copied().collect(),
            testers: queue.testers.clone(),
            panel: queue.panel,
        }
    }

    /// Keys of every queue `player` is currently waiting in.
    pub async fn queues_of(&self, player: UserId) -> Vec<QueueKey> {
        let mut keys = Vec::new();
        for gamemode in Gamemode::ALL {
            for region in Region::ALL {
                let key = QueueKey::new(gamemode, region);
                if self.slot(key).lock().await.position_of(player).is_some() {
                    keys.push(key);
                }
            }
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn sword() -> QueueKey {
        QueueKey::new(Gamemode::Sword, Region::Eu)
    }

    fn user(id: u64) -> UserId {
        UserId::new(id)
    }

    #[tokio::test]
    async fn position_equals_length_at_insertion() {
        let registry = QueueRegistry::new();
        for id in 1..=4 {
            let position = registry.enqueue(sword(), user(id)).await.unwrap();
            assert_eq!(position, id as usize);
            assert_eq!(registry.position(sword(), user(id)).await, Ok(id as usize));
        }
    }

    #[tokio::test]
    async fn restored_player_is_next_again() {
        let registry = QueueRegistry::new();
        registry.enqueue(sword(), user(1)).await.unwrap();
        registry.enqueue(sword(), user(2)).await.unwrap();

        let head = registry.next(sword()).await.unwrap();
        registry.restore_head(sword(), head).await;
        registry.restore_head(sword(), head).await;

        assert_eq!(registry.snapshot(sword()).await.waiting, vec![user(1), user(2)]);
        assert_eq!(registry.next(sword()).await, Ok(user(1)));
    }

    #[tokio::test]
    async fn double_enqueue_is_rejected_without_side_effects() {
        let registry = QueueRegistry::new();
        registry.enqueue(sword(), user(1)).await.unwrap();
        registry.enqueue(sword(), user(2)).await.unwrap();

        assert_eq!(
            registry.enqueue(sword(), user(1)).await,
            Err(TierlistError::AlreadyQueued)
        );
        assert_eq!(registry.snapshot(sword()).await.waiting, vec![user(1), user(2)]);
    }

    #[tokio::test]
    async fn next_is_fifo_then_empty() {
        let registry = QueueRegistry::new();
        let (a, b, c) = (user(10), user(11), user(12));
        for player in [a, b, c] {
            registry.enqueue(sword(), player).await.unwrap();
        }

        assert_eq!(registry.next(sword()).await, Ok(a));
        assert_eq!(registry.next(sword()).await, Ok(b));
        assert_eq!(registry.next(sword()).await, Ok(c));
        assert_eq!(registry.next(sword()).await, Err(TierlistError::QueueEmpty));
    }

    #[tokio::test]
    async fn dequeue_then_enqueue_goes_to_the_back() {
        let registry = QueueRegistry::new();
        for id in 1..=3 {
            registry.enqueue(sword(), user(id)).await.unwrap();
        }

        registry.dequeue(sword(), user(1)).await.unwrap();
        assert_eq!(registry.enqueue(sword(), user(1)).await, Ok(3));
        assert_eq!(registry.next(sword()).await, Ok(user(2)));
    }

    #[tokio::test]
    async fn dequeue_of_absent_player_fails() {
        let registry = QueueRegistry::new();
        registry.enqueue(sword(), user(1)).await.unwrap();

        assert_eq!(
            registry.dequeue(sword(), user(2)).await,
            Err(TierlistError::NotQueued)
        );
        assert_eq!(
            registry.position(sword(), user(2)).await,
            Err(TierlistError::NotQueued)
        );
        assert_eq!(registry.snapshot(sword()).await.waiting, vec![user(1)]);
    }

    #[tokio::test]
    async fn queues_are_independent() {
        let registry = QueueRegistry::new();
        let crystal = QueueKey::new(Gamemode::Crystal, Region::Eu);
        let sword_na = QueueKey::new(Gamemode::Sword, Region::Na);

        registry.enqueue(sword(), user(1)).await.unwrap();
        registry.enqueue(crystal, user(1)).await.unwrap();
        registry.enqueue(sword_na, user(1)).await.unwrap();

        assert_eq!(registry.queues_of(user(1)).await.len(), 3);
        registry.next(crystal).await.unwrap();
        assert_eq!(registry.position(sword(), user(1)).await, Ok(1));
        assert_eq!(registry.next(crystal).await, Err(TierlistError::QueueEmpty));
    }

    #[tokio::test]
    async fn last_tester_leaving_closes_and_clears() {
        let registry = QueueRegistry::new();
        let (t1, t2) = (user(100), user(101));

        assert!(!registry.is_open(sword()).await);
        registry.open(sword(), t1).await.unwrap();
        registry.open(sword(), t2).await.unwrap();
        assert_eq!(
            registry.open(sword(), t1).await,
            Err(TierlistError::TesterAlreadyActive)
        );
        registry.enqueue(sword(), user(1)).await.unwrap();

        assert_eq!(registry.close(sword(), t1).await, Ok(false));
        assert_eq!(registry.snapshot(sword()).await.waiting.len(), 1);

        assert_eq!(registry.close(sword(), t2).await, Ok(true));
        let snapshot = registry.snapshot(sword()).await;
        assert!(!snapshot.is_open());
        assert!(snapshot.waiting.is_empty());

        assert_eq!(
            registry.close(sword(), t2).await,
            Err(TierlistError::TesterNotActive)
        );
    }

    #[tokio::test]
    async fn admin_overrides() {
        let registry = QueueRegistry::new();
        registry.force_open(sword(), user(100)).await;
        registry.force_open(sword(), user(100)).await;
        assert_eq!(registry.snapshot(sword()).await.testers, vec![user(100)]);

        registry.enqueue(sword(), user(1)).await.unwrap();
        registry.enqueue(sword(), user(2)).await.unwrap();
        assert_eq!(registry.clear(sword()).await, 2);
        assert!(registry.is_open(sword()).await);

        registry.enqueue(sword(), user(3)).await.unwrap();
        assert_eq!(registry.force_close(sword()).await, 1);
        assert!(!registry.is_open(sword()).await);
    }

    #[tokio::test]
    async fn concurrent_enqueues_keep_one_position_per_player() {
        let registry = Arc::new(QueueRegistry::new());
        let mut handles = Vec::new();
        for attempt in 0..20u64 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry.enqueue(sword(), user(attempt % 5 + 1)).await
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 5);
        assert_eq!(registry.snapshot(sword()).await.waiting.len(), 5);
    }
}
