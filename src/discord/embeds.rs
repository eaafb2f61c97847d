use poise::serenity_prelude::{CreateEmbed, CreateEmbedFooter, Mentionable, Timestamp, UserId};

use crate::tierlist::{PlayerProfile, QueueSnapshot, TestSession, Tier};

const COLOR_RESULT: u32 = 0x9b59b6;
const COLOR_TICKET: u32 = 0x3498db;
const COLOR_INFO: u32 = 0x5865f2;
const COLOR_OPEN: u32 = 0x2ecc71;
const COLOR_CLOSED: u32 = 0xe74c3c;

/// Public tier update posted in the results channel.
pub fn result_embed(
    profile: &PlayerProfile,
    tester: UserId,
    session: &TestSession,
    previous: Tier,
    awarded: Tier,
    avatar_url: &str,
) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("{}'s Tier Update 🏆", profile.ign))
        .color(COLOR_RESULT)
        .thumbnail(avatar_url)
        .field("Tester", tester.mention().to_string(), true)
        .field("Minecraft Username", profile.ign.clone(), true)
        .field("Game Mode", session.gamemode.display_name(), true)
        .field("Previous Rank", previous.as_str(), true)
        .field("Rank Earned", awarded.as_str(), true)
        .field("Region", session.region.to_string(), true)
        .timestamp(Timestamp::now())
}

/// First message of a ticket channel.
pub fn ticket_embed(session: &TestSession, profile: &PlayerProfile) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("🎮 {} Test - {}", session.gamemode, session.region))
        .color(COLOR_TICKET)
        .field("Player", session.candidate.mention().to_string(), true)
        .field("Tester", session.tester.mention().to_string(), true)
        .field("IGN", profile.ign.clone(), true)
        .field("Account Type", profile.account_type.to_string(), true)
        .field("Region", profile.region.to_string(), true)
        .footer(CreateEmbedFooter::new(format!(
            "Session {} | /result tier:<tier> session:{} when done",
            session.id, session.id
        )))
}

pub fn status_embed(snapshot: &QueueSnapshot) -> CreateEmbed {
    let (status, color) = if snapshot.is_open() {
        ("🟢 Open", COLOR_OPEN)
    } else {
        ("🔴 Closed", COLOR_CLOSED)
    };

    CreateEmbed::new()
        .title(format!(
            "{} ({}) Status",
            snapshot.key.gamemode, snapshot.key.region
        ))
        .color(color)
        .field("Status", status, true)
        .field("Queue Size", snapshot.waiting.len().to_string(), true)
        .field("Active Testers", snapshot.testers.len().to_string(), true)
}

pub fn profile_embed(profile: &PlayerProfile, avatar_url: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("👤 {}", profile.ign))
        .color(COLOR_INFO)
        .thumbnail(avatar_url)
        .field("Discord", profile.user_id.mention().to_string(), true)
        .field("Account Type", profile.account_type.to_string(), true)
        .field("Region", profile.region.to_string(), true)
}

pub fn waitlist_info_embed() -> CreateEmbed {
    CreateEmbed::new()
        .title("📜 Evaluation Testing Waitlist & Roles")
        .color(COLOR_INFO)
        .description(
            "**Step 1: Register Your Profile**\n\
             Use `/register` to set your in-game details.\n\n\
             **Step 2: Get a Waitlist Role**\n\
             After registering, use `/waitlist` with any gamemode to get the \
             corresponding waitlist role.\n\n\
             • Region: NA, EU, AS/AU\n\
             • Username: The name of the account you will be testing on.\n\n\
             ⚠️ Failure to provide authentic information will result in a denied test.",
        )
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude::UserId;
    use serde_json::Value;

    use super::*;
    use crate::tierlist::{AccountType, Gamemode, QueueKey, Region, SessionBook};

    fn field<'a>(embed: &'a Value, name: &str) -> Option<&'a str> {
        embed["fields"]
            .as_array()?
            .iter()
            .find(|f| f["name"] == name)?["value"]
            .as_str()
    }

    #[test]
    fn status_reflects_queue_state() {
        let snapshot = QueueSnapshot {
            key: QueueKey::new(Gamemode::Crystal, Region::Eu),
            waiting: vec![UserId::new(1), UserId::new(2)],
            testers: vec![UserId::new(9)],
            panel: None,
        };

        let embed = serde_json::to_value(status_embed(&snapshot)).unwrap();
        assert_eq!(embed["title"], "Crystal (EU) Status");
        assert_eq!(field(&embed, "Status"), Some("🟢 Open"));
        assert_eq!(field(&embed, "Queue Size"), Some("2"));
        assert_eq!(field(&embed, "Active Testers"), Some("1"));
    }

    #[test]
    fn closed_queue_status() {
        let snapshot = QueueSnapshot {
            key: QueueKey::new(Gamemode::Mace, Region::Na),
            waiting: Vec::new(),
            testers: Vec::new(),
            panel: None,
        };

        let embed = serde_json::to_value(status_embed(&snapshot)).unwrap();
        assert_eq!(field(&embed, "Status"), Some("🔴 Closed"));
    }

    #[tokio::test]
    async fn ticket_footer_spells_out_the_result_command() {
        let book = SessionBook::new();
        let session = book
            .pair(
                QueueKey::new(Gamemode::Sword, Region::Na),
                UserId::new(100),
                UserId::new(1),
            )
            .await;
        let profile =
            PlayerProfile::new(UserId::new(1), "Dream", AccountType::Premium, Region::Na).unwrap();

        let embed = serde_json::to_value(ticket_embed(&session, &profile)).unwrap();
        let footer = embed["footer"]["text"].as_str().unwrap();
        assert_eq!(
            footer,
            format!("Session {0} | /result tier:<tier> session:{0} when done", session.id)
        );
        assert_eq!(field(&embed, "IGN"), Some("Dream"));
    }
}
