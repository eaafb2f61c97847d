mod bot;
pub mod commands;
pub mod embeds;
pub mod guild;
mod handler;
pub mod panel;
mod queueing;

pub use bot::{Data, create_framework};
