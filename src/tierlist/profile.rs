use std::fmt;
use std::str::FromStr;

use poise::ChoiceParameter;
use poise::serenity_prelude::UserId;

use super::{Region, TierlistError};

const IGN_MAX_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ChoiceParameter)]
pub enum AccountType {
    Premium,
    Cracked,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Premium => "Premium",
            Self::Cracked => "Cracked",
        }
    }
}

impl FromStr for AccountType {
    type Err = TierlistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "premium" => Ok(Self::Premium),
            "cracked" => Ok(Self::Cracked),
            _ => Err(TierlistError::InvalidAccountType(s.to_string())),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    pub user_id: UserId,
    pub ign: String,
    pub account_type: AccountType,
    pub region: Region,
}

impl PlayerProfile {
    pub fn new(
        user_id: UserId,
        ign: &str,
        account_type: AccountType,
        region: Region,
    ) -> Result<Self, TierlistError> {
        let ign = ign.trim();
        let valid = !ign.is_empty()
            && ign.chars().count() <= IGN_MAX_LEN
            && !ign.chars().any(char::is_whitespace);
        if !valid {
            return Err(TierlistError::InvalidIgn(ign.to_string()));
        }

        Ok(Self {
            user_id,
            ign: ign.to_string(),
            account_type,
            region,
        })
    }
}
