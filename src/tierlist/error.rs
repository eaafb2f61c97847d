use thiserror::Error;

use super::SessionId;

/// Rejections reported back to the user who issued the command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TierlistError {
    #[error("You are already in this queue.")]
    AlreadyQueued,

    #[error("You are not in this queue.")]
    NotQueued,

    #[error("The queue is empty.")]
    QueueEmpty,

    #[error("Unknown gamemode: `{0}`")]
    UnknownGamemode(String),

    #[error("Invalid tier: `{0}`. Valid: Unranked, LT5, HT5, LT4, HT4, LT3, HT3, LT2, HT2, LT1, HT1")]
    InvalidTier(String),

    #[error("No active test session with id `{0}`.")]
    SessionNotFound(SessionId),

    #[error("You have no open test session.")]
    NoOpenSession,

    #[error("You have {0} open sessions, please give a session id.")]
    SessionIdRequired(usize),

    #[error("The queue is closed. No tester is currently online.")]
    QueueClosed,

    #[error("You are already active for this queue.")]
    TesterAlreadyActive,

    #[error("You are not active for this queue.")]
    TesterNotActive,

    #[error("Invalid region: `{0}`. Must be NA, EU or AS-AU.")]
    InvalidRegion(String),

    #[error("Invalid account type: `{0}`. Must be Premium or Cracked.")]
    InvalidAccountType(String),

    #[error("Invalid Minecraft username: `{0}`")]
    InvalidIgn(String),

    #[error("Please register your profile first with `/register`.")]
    NotRegistered,

    #[error("You need the `{0}` role to do this.")]
    MissingRole(String),

    #[error("Please wait {secs} seconds before submitting another result.")]
    OnCooldown { secs: u64 },
}
