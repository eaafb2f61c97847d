use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use poise::serenity_prelude::UserId;

use super::TierlistError;

/// Allows each tester one result submission per period.
///
/// A slot taken by [`check`](Self::check) can be handed back with
/// [`release`](Self::release) when the submission it guarded failed.
pub struct ResultCooldown {
    quota: Quota,
    limiters: Mutex<HashMap<UserId, DefaultDirectRateLimiter>>,
    clock: DefaultClock,
}

impl std::fmt::Debug for ResultCooldown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCooldown")
            .field("quota", &self.quota)
            .finish_non_exhaustive()
    }
}

impl ResultCooldown {
    pub fn new(period: Duration) -> Self {
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
            .allow_burst(NonZeroU32::MIN);

        Self {
            quota,
            limiters: Mutex::new(HashMap::new()),
            clock: DefaultClock::default(),
        }
    }

    /// Takes the tester's slot, or reports how long they still have to wait.
    pub fn check(&self, tester: UserId) -> Result<(), TierlistError> {
        let mut limiters = self.limiters.lock().unwrap_or_else(PoisonError::into_inner);
        limiters
            .entry(tester)
            .or_insert_with(|| RateLimiter::direct(self.quota))
            .check()
            .map_err(|not_until| {
                let wait = not_until.wait_time_from(self.clock.now());
                TierlistError::OnCooldown {
                    secs: wait.as_secs().max(1),
                }
            })
    }

    /// Gives the slot back, as if the tester never submitted.
    pub fn release(&self, tester: UserId) {
        self.limiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&tester);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_submission_within_period_is_rejected() {
        let cooldown = ResultCooldown::new(Duration::from_secs(30));
        let tester = UserId::new(5);

        assert!(cooldown.check(tester).is_ok());
        match cooldown.check(tester) {
            Err(TierlistError::OnCooldown { secs }) => assert!((1..=30).contains(&secs)),
            other => panic!("expected cooldown, got {other:?}"),
        }
    }

    #[test]
    fn testers_are_limited_independently() {
        let cooldown = ResultCooldown::new(Duration::from_secs(30));
        assert!(cooldown.check(UserId::new(5)).is_ok());
        assert!(cooldown.check(UserId::new(6)).is_ok());
    }

    #[test]
    fn released_slot_can_be_taken_again() {
        let cooldown = ResultCooldown::new(Duration::from_secs(30));
        let tester = UserId::new(5);

        cooldown.check(tester).unwrap();
        cooldown.release(tester);
        assert!(cooldown.check(tester).is_ok());
        assert!(cooldown.check(tester).is_err());
    }
}
