use crate::discord::bot::Context;
use crate::discord::embeds;
use crate::error::AppError;

/// Post the waitlist instructions panel in this channel
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn panel(ctx: Context<'_>) -> Result<(), AppError> {
    ctx.send(poise::CreateReply::default().embed(embeds::waitlist_info_embed()))
        .await?;
    Ok(())
}
