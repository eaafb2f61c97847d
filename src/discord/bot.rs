use std::sync::Arc;
use std::time::Duration;

use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::db::Repository;
use crate::error::AppError;
use crate::mojang::MojangClient;
use crate::poller::SessionSweeper;
use crate::tierlist::{Gamemode, QueueKey, QueueRegistry, Region, ResultCooldown, RoleTable, SessionBook};

use super::{commands, handler, panel};

/// Shared data accessible in all commands
#[derive(Debug)]
pub struct Data {
    pub config: Config,
    pub db: Repository,
    pub mojang: MojangClient,
    pub queues: Arc<QueueRegistry>,
    pub sessions: Arc<SessionBook>,
    pub roles: RoleTable,
    pub cooldown: ResultCooldown,
}

impl Data {
    pub fn new(config: Config, db: Repository) -> Self {
        Self {
            mojang: MojangClient::new(config.mojang_rate_limit_per_minute),
            queues: Arc::new(QueueRegistry::new()),
            sessions: Arc::new(SessionBook::new()),
            roles: config.role_table(),
            cooldown: ResultCooldown::new(Duration::from_secs(config.result_cooldown_secs)),
            config,
            db,
        }
    }
}

pub type Context<'a> = poise::Context<'a, Data, AppError>;

pub fn create_framework(data: Data) -> poise::Framework<Data, AppError> {
    poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::register(),
                commands::profile(),
                commands::waitlist(),
                commands::join(),
                commands::leave(),
                commands::position(),
                commands::start(),
                commands::stop(),
                commands::next(),
                commands::status(),
                commands::result(),
                commands::abandon(),
                commands::admin(),
                commands::config(),
                commands::panel(),
            ],
            on_error: |error| {
                Box::pin(async move {
                    handle_error(error).await;
                })
            },
            event_handler: |ctx, event, _framework, data| {
                Box::pin(handler::event_handler(ctx, event, data))
            },
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!(
                    bot_name = %ready.user.name,
                    guild_count = ready.guilds.len(),
                    "🎮 Bot is ready"
                );

                SessionSweeper::new(
                    ctx.http.clone(),
                    data.sessions.clone(),
                    Duration::from_secs(data.config.session_timeout_secs),
                    Duration::from_secs(data.config.session_sweep_interval_secs),
                )
                .spawn();

                for guild in &ready.guilds {
                    for gamemode in Gamemode::ALL {
                        for region in Region::ALL {
                            let key = QueueKey::new(gamemode, region);
                            if let Err(e) =
                                panel::publish(&ctx.http, &data.queues, guild.id, key, false).await
                            {
                                warn!(error = %e, ?key, "📋 ⚠️ Failed to post initial panel");
                            }
                        }
                    }
                }

                Ok(data)
            })
        })
        .build()
}

async fn handle_error(error: poise::FrameworkError<'_, Data, AppError>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            let command_name = ctx.command().qualified_name.as_str();
            let reply = if error.is_user_facing() {
                warn!(
                    error = %error,
                    command = command_name,
                    user_id = %ctx.author().id,
                    "🎮 ⚠️ Command rejected"
                );
                format!("❌ {error}")
            } else {
                error!(
                    error = ?error,
                    command = command_name,
                    user_id = %ctx.author().id,
                    "🎮 ❌ Command execution failed"
                );
                "❌ Something went wrong. Please try again later.".to_string()
            };
            let _ = ctx
                .send(poise::CreateReply::default().content(reply).ephemeral(true))
                .await;
        }
        poise::FrameworkError::ArgumentParse { error, ctx, .. } => {
            warn!(
                error = %error,
                command = ctx.command().name.as_str(),
                "🎮 ⚠️ Invalid command argument"
            );
            let _ = ctx
                .send(
                    poise::CreateReply::default()
                        .content(format!("❌ Invalid argument: {error}"))
                        .ephemeral(true),
                )
                .await;
        }
        poise::FrameworkError::CommandCheckFailed { error, ctx, .. } => {
            if let Some(error) = error {
                error!(error = ?error, "🎮 ❌ Command check errored");
            }
            warn!(
                user_id = %ctx.author().id,
                command = ctx.command().qualified_name.as_str(),
                "🎮 ⚠️ Command check failed"
            );
            let _ = ctx
                .send(
                    poise::CreateReply::default()
                        .content("❌ You do not have permission to use this command.")
                        .ephemeral(true),
                )
                .await;
        }
        poise::FrameworkError::MissingBotPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            warn!(
                permissions = %missing_permissions,
                command = ctx.command().name.as_str(),
                "🎮 ⚠️ Bot missing permissions"
            );
            let _ = ctx
                .say(format!("Missing permissions: {missing_permissions}"))
                .await;
        }
        poise::FrameworkError::MissingUserPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            if let Some(perms) = missing_permissions {
                warn!(
                    permissions = %perms,
                    user_id = %ctx.author().id,
                    command = ctx.command().name.as_str(),
                    "🎮 ⚠️ User missing permissions"
                );
                let _ = ctx
                    .send(
                        poise::CreateReply::default()
                            .content(format!("You need these permissions: {perms}"))
                            .ephemeral(true),
                    )
                    .await;
            }
        }
        other => {
            error!(error = ?other, "🎮 ❌ Unhandled framework error");
        }
    }
}

/// Roles of the invoking member, empty outside a guild.
pub async fn author_role_names(ctx: Context<'_>) -> Result<Vec<String>, AppError> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(Vec::new());
    };
    super::guild::user_role_names(ctx.http(), guild_id, ctx.author().id).await
}

/// Guild of the invocation; every command using it is `guild_only`.
pub fn require_guild(ctx: Context<'_>) -> Result<serenity::GuildId, AppError> {
    ctx.guild_id()
        .ok_or_else(|| AppError::Config("Must be used in a guild".into()))
}
