use poise::serenity_prelude::{self as serenity, Mentionable};
use tracing::{info, instrument};

use crate::discord::bot::{Context, require_guild};
use crate::error::AppError;

/// Configure the bot for this server
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    subcommands("results_channel")
)]
pub async fn config(_ctx: Context<'_>) -> Result<(), AppError> {
    // Parent command, subcommands handle the actual work
    Ok(())
}

/// Set the channel where tier results are posted
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    rename = "results_channel"
)]
#[instrument(
    skip(ctx, channel),
    fields(
        guild_id,
        user_id = %ctx.author().id,
        channel_id = %channel.id
    )
)]
pub async fn results_channel(
    ctx: Context<'_>,
    #[description = "Channel for tier results"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), AppError> {
    let guild_id = require_guild(ctx)?;
    tracing::Span::current().record("guild_id", guild_id.get());

    ctx.data()
        .db
        .set_results_channel(guild_id.get(), channel.id.get())
        .await?;

    let embed = serenity::CreateEmbed::new()
        .title("Configuration Updated")
        .description(format!(
            "Tier results will now be posted in {}",
            channel.mention()
        ))
        .color(0x00ff00);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    info!("🏆 Results channel configured");

    Ok(())
}
