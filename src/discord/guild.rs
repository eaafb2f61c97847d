//! Guild lookups and mutations shared by commands and button handlers.

use poise::serenity_prelude::{
    ChannelId, ChannelType, CreateChannel, EditRole, GuildChannel, GuildId, Http, Member,
    PermissionOverwrite, PermissionOverwriteType, Permissions, Role, RoleId, UserId,
};
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::tierlist::RoleChange;

pub const TICKET_CATEGORY: &str = "Testing Tickets";

fn ticket_access() -> Permissions {
    Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES | Permissions::READ_MESSAGE_HISTORY
}

/// Names of the roles held by `member`.
pub async fn member_role_names(
    http: &Http,
    guild_id: GuildId,
    member: &Member,
) -> Result<Vec<String>, AppError> {
    let roles = guild_id.roles(http).await?;
    Ok(member
        .roles
        .iter()
        .filter_map(|id| roles.get(id).map(|role| role.name.clone()))
        .collect())
}

pub async fn user_role_names(
    http: &Http,
    guild_id: GuildId,
    user_id: UserId,
) -> Result<Vec<String>, AppError> {
    let member = guild_id.member(http, user_id).await?;
    member_role_names(http, guild_id, &member).await
}

pub async fn find_role(http: &Http, guild_id: GuildId, name: &str) -> Result<Option<Role>, AppError> {
    let roles = guild_id.roles(http).await?;
    Ok(roles.into_values().find(|role| role.name == name))
}

/// Looks a role up by name, creating it when the guild has none.
pub async fn ensure_role(http: &Http, guild_id: GuildId, name: &str) -> Result<RoleId, AppError> {
    if let Some(role) = find_role(http, guild_id, name).await? {
        return Ok(role.id);
    }

    let role = guild_id.create_role(http, EditRole::new().name(name)).await?;
    info!(role = %name, role_id = %role.id, "🏷️ Created missing role");
    Ok(role.id)
}

pub async fn find_text_channel(
    http: &Http,
    guild_id: GuildId,
    name: &str,
) -> Result<Option<GuildChannel>, AppError> {
    let channels = guild_id.channels(http).await?;
    Ok(channels
        .into_values()
        .find(|channel| channel.kind == ChannelType::Text && channel.name == name))
}

async fn ensure_ticket_category(http: &Http, guild_id: GuildId) -> Result<ChannelId, AppError> {
    let channels = guild_id.channels(http).await?;
    if let Some(category) = channels
        .values()
        .find(|c| c.kind == ChannelType::Category && c.name == TICKET_CATEGORY)
    {
        return Ok(category.id);
    }

    let category = guild_id
        .create_channel(
            http,
            CreateChannel::new(TICKET_CATEGORY).kind(ChannelType::Category),
        )
        .await?;
    info!(category_id = %category.id, "🎫 Created ticket category");
    Ok(category.id)
}

/// Private channel for one test session. Hidden from `@everyone`, visible to
/// the candidate, the tester, the bot and every staff role that exists.
pub async fn create_ticket_channel(
    http: &Http,
    guild_id: GuildId,
    name: &str,
    members: &[UserId],
    staff_roles: &[String],
) -> Result<GuildChannel, AppError> {
    let category = ensure_ticket_category(http, guild_id).await?;
    let roles = guild_id.roles(http).await?;

    // @everyone shares the guild's id
    let everyone = RoleId::new(guild_id.get());
    let mut overwrites = vec![PermissionOverwrite {
        allow: Permissions::empty(),
        deny: Permissions::VIEW_CHANNEL,
        kind: PermissionOverwriteType::Role(everyone),
    }];
    overwrites.extend(members.iter().map(|user| PermissionOverwrite {
        allow: ticket_access(),
        deny: Permissions::empty(),
        kind: PermissionOverwriteType::Member(*user),
    }));
    overwrites.extend(
        roles
            .values()
            .filter(|role| staff_roles.contains(&role.name))
            .map(|role| PermissionOverwrite {
                allow: ticket_access(),
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Role(role.id),
            }),
    );

    let channel = guild_id
        .create_channel(
            http,
            CreateChannel::new(name)
                .kind(ChannelType::Text)
                .category(category)
                .permissions(overwrites),
        )
        .await?;

    info!(channel_id = %channel.id, channel = %name, "🎫 Ticket channel created");
    Ok(channel)
}

pub async fn grant_channel_view(
    http: &Http,
    channel_id: ChannelId,
    user_id: UserId,
) -> Result<(), AppError> {
    channel_id
        .create_permission(
            http,
            PermissionOverwrite {
                allow: Permissions::VIEW_CHANNEL | Permissions::READ_MESSAGE_HISTORY,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Member(user_id),
            },
        )
        .await?;
    Ok(())
}

/// Swaps the tier roles of `user_id`. The new role is created when missing;
/// a previous role the guild no longer has is skipped.
pub async fn apply_role_change(
    http: &Http,
    guild_id: GuildId,
    user_id: UserId,
    change: &RoleChange,
) -> Result<(), AppError> {
    let member = guild_id.member(http, user_id).await?;

    if let Some(old) = &change.remove {
        match find_role(http, guild_id, old).await? {
            Some(role) if member.roles.contains(&role.id) => {
                member.remove_role(http, role.id).await?;
                debug!(%user_id, role = %old, "🏷️ Previous tier role removed");
            }
            Some(_) => {}
            None => warn!(role = %old, "🏷️ ⚠️ Previous tier role not found"),
        }
    }

    if let Some(new) = &change.add {
        let role_id = ensure_role(http, guild_id, new).await?;
        member.add_role(http, role_id).await?;
        debug!(%user_id, role = %new, "🏷️ Tier role assigned");
    }

    Ok(())
}

/// Lower-cased channel name safe for Discord, e.g. `test-sword-steve`.
pub fn ticket_channel_name(gamemode_slug: &str, ign: &str) -> String {
    let ign: String = ign
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase();
    format!("test-{gamemode_slug}-{ign}")
}
