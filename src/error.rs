use thiserror::Error;

use crate::tierlist::TierlistError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Tierlist(#[from] TierlistError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Discord error: {0}")]
    Discord(Box<serenity::Error>),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mojang API error: {status}")]
    MojangApi { status: u16 },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Rejections caused by the invoking user rather than by the bot.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, AppError::Tierlist(_))
    }
}

impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::Discord(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tierlist_errors_are_user_facing() {
        let err: AppError = TierlistError::QueueEmpty.into();
        assert!(err.is_user_facing());
        assert_eq!(err.to_string(), "The queue is empty.");
    }

    #[test]
    fn infrastructure_errors_are_not_user_facing() {
        let err = AppError::Config("DISCORD_TOKEN must be set".into());
        assert!(!err.is_user_facing());
        assert!(!AppError::MojangApi { status: 500 }.is_user_facing());
    }
}
