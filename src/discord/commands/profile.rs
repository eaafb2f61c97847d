use std::collections::HashSet;

use poise::serenity_prelude::{self as serenity, Mentionable};
use tracing::{info, instrument};

use crate::discord::bot::{Context, require_guild};
use crate::discord::{embeds, guild};
use crate::error::AppError;
use crate::tierlist::{AccountType, Gamemode, PlayerProfile, Region, TierlistError};

/// Register or update your tierlist profile
#[poise::command(slash_command, guild_only)]
#[instrument(skip(ctx), fields(user_id = %ctx.author().id))]
pub async fn register(
    ctx: Context<'_>,
    #[description = "Your Minecraft username"] ign: String,
    #[description = "Premium or Cracked"] account_type: AccountType,
    #[description = "Region you play from"] region: Region,
) -> Result<(), AppError> {
    let profile = PlayerProfile::new(ctx.author().id, &ign, account_type, region)?;
    ctx.data().db.upsert_profile(&profile).await?;

    info!(ign = %profile.ign, %region, "👤 Profile registered");

    ctx.send(
        poise::CreateReply::default()
            .content(format!(
                "✅ Profile saved!\n**IGN:** {}\n**Account Type:** {}\n**Region:** {}",
                profile.ign, profile.account_type, profile.region
            ))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

/// Show a registered profile
#[poise::command(slash_command, guild_only)]
#[instrument(skip(ctx, user), fields(user_id = %ctx.author().id))]
pub async fn profile(
    ctx: Context<'_>,
    #[description = "Member to look up (defaults to you)"] user: Option<serenity::User>,
) -> Result<(), AppError> {
    let target = user.as_ref().unwrap_or_else(|| ctx.author());

    let Some(profile) = ctx.data().db.get_profile(target.id.get()).await? else {
        let message = if target.id == ctx.author().id {
            TierlistError::NotRegistered.to_string()
        } else {
            format!("{} has not registered a profile.", target.mention())
        };
        ctx.send(poise::CreateReply::default().content(message).ephemeral(true))
            .await?;
        return Ok(());
    };

    ctx.defer_ephemeral().await?;
    let avatar = ctx.data().mojang.avatar_for(&profile).await;

    let mut embed = embeds::profile_embed(&profile, &avatar);
    let mut seen = HashSet::new();
    for result in ctx.data().db.get_player_results(target.id.get()).await? {
        // Newest first, so the first row per gamemode is the current tier
        if !seen.insert(result.gamemode.clone()) {
            continue;
        }
        if let Ok(tier) = result.new_tier() {
            let tested = result
                .recorded_at()
                .map(|at| format!(", {}", at.format("%Y-%m-%d")))
                .unwrap_or_default();
            embed = embed.field(
                result.gamemode.clone(),
                format!("{tier} ({}{tested})", result.region),
                true,
            );
        }
    }

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

/// Get a gamemode's waitlist role and channel access
#[poise::command(slash_command, guild_only)]
#[instrument(skip(ctx), fields(user_id = %ctx.author().id))]
pub async fn waitlist(
    ctx: Context<'_>,
    #[description = "Gamemode to wait for"] gamemode: Gamemode,
) -> Result<(), AppError> {
    let guild_id = require_guild(ctx)?;
    let user_id = ctx.author().id;

    if ctx.data().db.get_profile(user_id.get()).await?.is_none() {
        return Err(TierlistError::NotRegistered.into());
    }

    let http = ctx.http();
    let role_name = gamemode.waitlist_role_name();
    let role_id = guild::ensure_role(http, guild_id, &role_name).await?;
    let member = guild_id.member(http, user_id).await?;
    member.add_role(http, role_id).await?;

    if let Some(channel) =
        guild::find_text_channel(http, guild_id, &gamemode.waitlist_channel_name()).await?
    {
        guild::grant_channel_view(http, channel.id, user_id).await?;
    }

    info!(%gamemode, role = %role_name, "🏷️ Waitlist role granted");

    ctx.send(
        poise::CreateReply::default()
            .content(format!("✅ You now have access to the {gamemode} waitlist."))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}
