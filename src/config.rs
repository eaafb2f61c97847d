use std::env;
use std::num::NonZeroU32;

use nonzero_ext::nonzero;

use crate::error::AppError;
use crate::tierlist::RoleTable;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub database_url: String,
    pub results_channel_name: String,
    pub result_cooldown_secs: u64,
    pub session_timeout_secs: u64,
    pub session_sweep_interval_secs: u64,
    pub mojang_rate_limit_per_minute: NonZeroU32,
    pub tier_role_format: String,
    pub staff_roles: Vec<String>,
    pub result_roles: Vec<String>,
    pub admin_roles: Vec<String>,
}

const DEFAULT_DATABASE_URL: &str = "sqlite:tierlist.db?mode=rwc";
const DEFAULT_RESULTS_CHANNEL_NAME: &str = "tier-results";
const DEFAULT_RESULT_COOLDOWN_SECS: u64 = 30;
const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 3600;
const DEFAULT_SESSION_SWEEP_INTERVAL_SECS: u64 = 60;
const DEFAULT_TIER_ROLE_FORMAT: &str = "{tier} {gamemode}";
const DEFAULT_STAFF_ROLES: &str =
    "Senior Tester,Head Tester,Admin,Administrator,Moderator,Manager";
const DEFAULT_RESULT_ROLES: &str = "Senior Tester,Head Tester,Admin,Administrator,Manager";
const DEFAULT_ADMIN_ROLES: &str = "Admin,Administrator,Manager,Head Tester";

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| AppError::Config("DISCORD_TOKEN must be set".into()))?;

        Ok(Self::from_lookup(discord_token, |key| env::var(key).ok()))
    }

    fn from_lookup(discord_token: String, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let number = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };
        let list = |key: &str, default: &str| {
            parse_list(&lookup(key).unwrap_or_else(|| default.to_string()))
        };

        let mojang_rate_limit_per_minute = lookup("MOJANG_RATE_LIMIT_PER_MINUTE")
            .and_then(|v| v.trim().parse().ok())
            .and_then(NonZeroU32::new)
            .unwrap_or(nonzero!(60u32));

        let tier_role_format = lookup("TIER_ROLE_FORMAT")
            .filter(|format| format.contains("{tier}"))
            .unwrap_or_else(|| DEFAULT_TIER_ROLE_FORMAT.into());

        Self {
            discord_token,
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            results_channel_name: lookup("RESULTS_CHANNEL_NAME")
                .unwrap_or_else(|| DEFAULT_RESULTS_CHANNEL_NAME.into()),
            result_cooldown_secs: number("RESULT_COOLDOWN_SECS", DEFAULT_RESULT_COOLDOWN_SECS),
            session_timeout_secs: number("SESSION_TIMEOUT_SECS", DEFAULT_SESSION_TIMEOUT_SECS),
            session_sweep_interval_secs: number(
                "SESSION_SWEEP_INTERVAL_SECS",
                DEFAULT_SESSION_SWEEP_INTERVAL_SECS,
            ),
            mojang_rate_limit_per_minute,
            tier_role_format,
            staff_roles: list("STAFF_ROLES", DEFAULT_STAFF_ROLES),
            result_roles: list("RESULT_ROLES", DEFAULT_RESULT_ROLES),
            admin_roles: list("ADMIN_ROLES", DEFAULT_ADMIN_ROLES),
        }
    }

    pub fn role_table(&self) -> RoleTable {
        RoleTable::new(
            self.tier_role_format.clone(),
            self.staff_roles.clone(),
            self.result_roles.clone(),
            self.admin_roles.clone(),
        )
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
