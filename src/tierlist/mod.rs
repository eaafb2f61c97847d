mod cooldown;
mod error;
mod gamemode;
mod profile;
mod queue;
mod region;
mod roles;
mod session;
mod tier;

pub use cooldown::ResultCooldown;
pub use error::TierlistError;
pub use gamemode::Gamemode;
pub use profile::{AccountType, PlayerProfile};
pub use queue::{PanelMessage, QueueKey, QueueRegistry, QueueSnapshot};
pub use region::Region;
pub use roles::{RoleChange, RoleTable};
pub use session::{SessionBook, SessionId, TestSession, TierResult};
pub use tier::Tier;
