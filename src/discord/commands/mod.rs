mod admin;
mod config;
mod panel;
mod profile;
mod queue;
mod result;
mod tester;

pub use admin::admin;
pub use config::config;
pub use panel::panel;
pub use profile::{profile, register, waitlist};
pub use queue::{join, leave, position};
pub use result::{abandon, result};
pub use tester::{next, start, status, stop};
