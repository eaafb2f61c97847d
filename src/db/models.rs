use chrono::{DateTime, Utc};
use poise::serenity_prelude::UserId;
use sqlx::FromRow;

use crate::tierlist::{PlayerProfile, Tier, TierlistError};

#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub user_id: i64,
    pub ign: String,
    pub account_type: String,
    pub region: String,
}

impl TryFrom<ProfileRow> for PlayerProfile {
    type Error = TierlistError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(PlayerProfile {
            user_id: UserId::new(row.user_id as u64),
            ign: row.ign,
            account_type: row.account_type.parse()?,
            region: row.region.parse()?,
        })
    }
}

/// One line of a player's result history.
#[derive(Debug, Clone, FromRow)]
pub struct ResultRow {
    pub gamemode: String,
    pub region: String,
    pub new_tier: String,
    pub recorded_at: i64,
}

impl ResultRow {
    pub fn new_tier(&self) -> Result<Tier, TierlistError> {
        self.new_tier.parse()
    }

    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.recorded_at, 0)
    }
}

/// A resolved test ready to be appended to the result log.
#[derive(Debug, Clone)]
pub struct NewResult<'a> {
    pub tester_id: u64,
    pub player_id: u64,
    pub ign: &'a str,
    pub gamemode: &'a str,
    pub region: &'a str,
    pub previous_tier: Tier,
    pub new_tier: Tier,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Guild {
    pub id: i64,
    pub results_channel_id: Option<i64>,
}
