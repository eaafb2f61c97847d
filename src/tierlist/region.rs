use std::fmt;
use std::str::FromStr;

use poise::ChoiceParameter;

use super::TierlistError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ChoiceParameter)]
pub enum Region {
    #[name = "NA"]
    Na,
    #[name = "EU"]
    Eu,
    #[name = "AS/AU"]
    As,
}

impl Region {
    pub const ALL: [Region; 3] = [Self::Na, Self::Eu, Self::As];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Na => "NA",
            Self::Eu => "EU",
            Self::As => "AS",
        }
    }
}

impl FromStr for Region {
    type Err = TierlistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NA" => Ok(Self::Na),
            "EU" => Ok(Self::Eu),
            "AS" | "AS-AU" | "AS/AU" => Ok(Self::As),
            _ => Err(TierlistError::InvalidRegion(s.to_string())),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
