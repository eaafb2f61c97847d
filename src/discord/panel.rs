//! Live queue panel posted in `#waitlist-<gamemode>`, one per region.

use chrono::Utc;
use poise::serenity_prelude::{
    ButtonStyle, CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter, CreateMessage,
    EditMessage, GuildId, Http, Mentionable,
};
use tracing::{debug, warn};

use super::guild;
use crate::error::AppError;
use crate::tierlist::{
    Gamemode, PanelMessage, QueueKey, QueueRegistry, QueueSnapshot, Region,
};

const PANEL_LIST_LIMIT: usize = 15;

/// Button intents carried in a component's custom id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    Join(QueueKey),
    Leave(QueueKey),
}

impl PanelAction {
    pub fn custom_id(&self) -> String {
        let (verb, key) = match self {
            Self::Join(key) => ("join", key),
            Self::Leave(key) => ("leave", key),
        };
        format!("queue:{verb}:{}:{}", key.gamemode.slug(), key.region)
    }

    pub fn parse(custom_id: &str) -> Option<Self> {
        let mut parts = custom_id.split(':');
        if parts.next()? != "queue" {
            return None;
        }
        let verb = parts.next()?;
        let gamemode: Gamemode = parts.next()?.parse().ok()?;
        let region: Region = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }

        let key = QueueKey::new(gamemode, region);
        match verb {
            "join" => Some(Self::Join(key)),
            "leave" => Some(Self::Leave(key)),
            _ => None,
        }
    }
}

pub fn panel_embed(snapshot: &QueueSnapshot) -> CreateEmbed {
    let QueueKey { gamemode, region } = snapshot.key;

    if !snapshot.is_open() {
        return CreateEmbed::new()
            .title(format!("🔒 {gamemode} Queue Closed"))
            .description(
                "This testing session has ended.\nYou will be notified here when a new queue opens.",
            )
            .color(0x4f545c)
            .footer(CreateEmbedFooter::new(format!("🌍 Region: {region}")));
    }

    let queue_field = if snapshot.waiting.is_empty() {
        "*Queue is empty*".to_string()
    } else {
        let mut lines: Vec<String> = snapshot
            .waiting
            .iter()
            .take(PANEL_LIST_LIMIT)
            .enumerate()
            .map(|(i, id)| format!("`{}.` {}", i + 1, id.mention()))
            .collect();
        if snapshot.waiting.len() > PANEL_LIST_LIMIT {
            lines.push("...".into());
        }
        lines.join("\n")
    };

    let testers = snapshot
        .testers
        .iter()
        .enumerate()
        .map(|(i, id)| format!("{}. {}", i + 1, id.mention()))
        .collect::<Vec<_>>()
        .join("\n");

    CreateEmbed::new()
        .title(format!("✅ {gamemode} Tester Available!"))
        .description("The queue is now open and updates in real-time.")
        .color(0x2ecc71)
        .field(format!("📋 Queue ({})", snapshot.waiting.len()), queue_field, false)
        .field("🎮 Active Testers", testers, false)
        .footer(CreateEmbedFooter::new(format!(
            "🌍 Region: {region} | ⏱ Last Updated: {}",
            Utc::now().format("%H:%M:%S UTC")
        )))
}

pub fn panel_components(key: QueueKey, disabled: bool) -> Vec<CreateActionRow> {
    vec![CreateActionRow::Buttons(vec![
        CreateButton::new(PanelAction::Join(key).custom_id())
            .label("Join Queue")
            .emoji('✅')
            .style(ButtonStyle::Success)
            .disabled(disabled),
        CreateButton::new(PanelAction::Leave(key).custom_id())
            .label("Leave Queue")
            .emoji('❌')
            .style(ButtonStyle::Danger)
            .disabled(disabled),
    ])]
}

fn open_ping(key: QueueKey) -> String {
    format!(
        "@here A **{}** queue is open for the **{}** region!",
        key.gamemode, key.region
    )
}

/// Re-renders the panel of `key` if one has been posted.
pub async fn refresh(http: &Http, queues: &QueueRegistry, key: QueueKey) {
    let snapshot = queues.snapshot(key).await;
    let Some(panel) = snapshot.panel else {
        return;
    };

    let edit = EditMessage::new()
        .embed(panel_embed(&snapshot))
        .components(panel_components(key, !snapshot.is_open()));

    if let Err(e) = panel.channel_id.edit_message(http, panel.message_id, edit).await {
        warn!(error = %e, ?key, "📋 ⚠️ Failed to refresh queue panel");
    }
}

/// Posts the panel of `key` in its waitlist channel, or updates the existing one.
/// `announce` adds the `@here` opening ping.
pub async fn publish(
    http: &Http,
    queues: &QueueRegistry,
    guild_id: GuildId,
    key: QueueKey,
    announce: bool,
) -> Result<(), AppError> {
    let snapshot = queues.snapshot(key).await;
    let content = if announce { open_ping(key) } else { String::new() };
    let embed = panel_embed(&snapshot);
    let components = panel_components(key, !snapshot.is_open());

    if let Some(panel) = snapshot.panel {
        let edit = EditMessage::new()
            .content(content.clone())
            .embed(embed.clone())
            .components(components.clone());
        match panel.channel_id.edit_message(http, panel.message_id, edit).await {
            Ok(_) => return Ok(()),
            Err(e) => debug!(error = %e, ?key, "📋 Panel message gone, posting a new one"),
        }
    }

    let channel_name = key.gamemode.waitlist_channel_name();
    let Some(channel) = guild::find_text_channel(http, guild_id, &channel_name).await? else {
        warn!(channel = %channel_name, "📋 ⚠️ Waitlist channel not found, panel not posted");
        return Ok(());
    };

    let message = CreateMessage::new()
        .content(content)
        .embed(embed)
        .components(components);
    let sent = channel.id.send_message(http, message).await?;
    queues
        .set_panel(
            key,
            PanelMessage {
                channel_id: channel.id,
                message_id: sent.id,
            },
        )
        .await;

    Ok(())
}
