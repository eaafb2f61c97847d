use std::fmt;
use std::str::FromStr;

use poise::ChoiceParameter;

use super::TierlistError;

/// Competitive categories, each with its own queues and tier ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ChoiceParameter)]
pub enum Gamemode {
    Netherite,
    Potion,
    Sword,
    Crystal,
    #[name = "UHC"]
    Uhc,
    #[name = "SMP"]
    Smp,
    #[name = "DiaSMP"]
    DiaSmp,
    Axe,
    Mace,
}

impl Gamemode {
    pub const ALL: [Gamemode; 9] = [
        Self::Netherite,
        Self::Potion,
        Self::Sword,
        Self::Crystal,
        Self::Uhc,
        Self::Smp,
        Self::DiaSmp,
        Self::Axe,
        Self::Mace,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Netherite => "Netherite",
            Self::Potion => "Potion",
            Self::Sword => "Sword",
            Self::Crystal => "Crystal",
            Self::Uhc => "UHC",
            Self::Smp => "SMP",
            Self::DiaSmp => "DiaSMP",
            Self::Axe => "Axe",
            Self::Mace => "Mace",
        }
    }

    /// Lowercase form used in channel names and button ids.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Netherite => "netherite",
            Self::Potion => "potion",
            Self::Sword => "sword",
            Self::Crystal => "crystal",
            Self::Uhc => "uhc",
            Self::Smp => "smp",
            Self::DiaSmp => "diasmp",
            Self::Axe => "axe",
            Self::Mace => "mace",
        }
    }

    pub fn waitlist_channel_name(&self) -> String {
        format!("waitlist-{}", self.slug())
    }

    pub fn waitlist_role_name(&self) -> String {
        format!("Waitlist {}", self.display_name())
    }

    pub fn tester_role_name(&self) -> String {
        format!("{} Tester", self.display_name())
    }
}

impl FromStr for Gamemode {
    type Err = TierlistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|gm| gm.slug().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TierlistError::UnknownGamemode(s.to_string()))
    }
}

impl fmt::Display for Gamemode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("sword".parse::<Gamemode>(), Ok(Gamemode::Sword));
        assert_eq!("DiaSMP".parse::<Gamemode>(), Ok(Gamemode::DiaSmp));
        assert_eq!(" UHC ".parse::<Gamemode>(), Ok(Gamemode::Uhc));
    }

    #[test]
    fn unknown_gamemode_is_rejected() {
        assert_eq!(
            "bedwars".parse::<Gamemode>(),
            Err(TierlistError::UnknownGamemode("bedwars".into()))
        );
    }

    #[test]
    fn derived_role_and_channel_names() {
        assert_eq!(Gamemode::Smp.tester_role_name(), "SMP Tester");
        assert_eq!(Gamemode::Crystal.waitlist_role_name(), "Waitlist Crystal");
        assert_eq!(Gamemode::DiaSmp.waitlist_channel_name(), "waitlist-diasmp");
    }
}
