use poise::serenity_prelude::{
    self as serenity, ComponentInteraction, CreateInteractionResponse,
    CreateInteractionResponseMessage,
};
use tracing::{debug, error, instrument, warn};

use super::panel::PanelAction;
use super::{Data, queueing};
use crate::error::AppError;

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    data: &Data,
) -> Result<(), AppError> {
    if let serenity::FullEvent::InteractionCreate {
        interaction: serenity::Interaction::Component(component),
    } = event
    {
        let Some(action) = PanelAction::parse(&component.data.custom_id) else {
            debug!(custom_id = %component.data.custom_id, "🔘 Ignoring unknown component");
            return Ok(());
        };
        handle_panel_action(ctx, component, data, action).await?;
    }

    Ok(())
}

#[instrument(skip_all, fields(user_id = %component.user.id, ?action))]
async fn handle_panel_action(
    ctx: &serenity::Context,
    component: &ComponentInteraction,
    data: &Data,
    action: PanelAction,
) -> Result<(), AppError> {
    let user_id = component.user.id;

    let outcome = match (action, component.guild_id) {
        (_, None) => Err(AppError::Config("Must be used in a guild".into())),
        (PanelAction::Join(key), Some(guild_id)) => queueing::join(
            &ctx.http,
            data,
            guild_id,
            user_id,
            key.gamemode,
            Some(key.region),
        )
        .await
        .map(|(key, position)| {
            format!(
                "✅ You joined the **{}** queue ({}). Position: **#{position}**",
                key.gamemode, key.region
            )
        }),
        (PanelAction::Leave(key), Some(_)) => {
            queueing::leave(&ctx.http, data, user_id, key.gamemode, Some(key.region))
                .await
                .map(|key| format!("✅ You left the **{}** queue ({}).", key.gamemode, key.region))
        }
    };

    let content = match outcome {
        Ok(message) => message,
        Err(e) if e.is_user_facing() => {
            warn!(error = %e, "🔘 ⚠️ Panel action rejected");
            format!("❌ {e}")
        }
        Err(e) => {
            error!(error = ?e, "🔘 ❌ Panel action failed");
            "❌ Something went wrong. Please try again later.".to_string()
        }
    };

    component
        .create_response(
            ctx,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;

    Ok(())
}
