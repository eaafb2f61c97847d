use std::fmt;
use std::str::FromStr;

use poise::ChoiceParameter;

use super::TierlistError;

/// Awarded rank, ordered from lowest (`Unranked`) to highest (`HT1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ChoiceParameter)]
pub enum Tier {
    Unranked,
    #[name = "LT5"]
    Lt5,
    #[name = "HT5"]
    Ht5,
    #[name = "LT4"]
    Lt4,
    #[name = "HT4"]
    Ht4,
    #[name = "LT3"]
    Lt3,
    #[name = "HT3"]
    Ht3,
    #[name = "LT2"]
    Lt2,
    #[name = "HT2"]
    Ht2,
    #[name = "LT1"]
    Lt1,
    #[name = "HT1"]
    Ht1,
}

impl Tier {
    pub const ALL: [Tier; 11] = [
        Self::Unranked,
        Self::Lt5,
        Self::Ht5,
        Self::Lt4,
        Self::Ht4,
        Self::Lt3,
        Self::Ht3,
        Self::Lt2,
        Self::Ht2,
        Self::Lt1,
        Self::Ht1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unranked => "Unranked",
            Self::Lt5 => "LT5",
            Self::Ht5 => "HT5",
            Self::Lt4 => "LT4",
            Self::Ht4 => "HT4",
            Self::Lt3 => "LT3",
            Self::Ht3 => "HT3",
            Self::Lt2 => "LT2",
            Self::Ht2 => "HT2",
            Self::Lt1 => "LT1",
            Self::Ht1 => "HT1",
        }
    }

    pub fn is_ranked(&self) -> bool {
        *self != Self::Unranked
    }
}

impl FromStr for Tier {
    type Err = TierlistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TierlistError::InvalidTier(s.to_string()))
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
