use poise::serenity_prelude as serenity;
use tracing::info;

mod config;
mod db;
mod discord;
mod error;
mod logging;
mod mojang;
mod poller;
mod tierlist;

use config::Config;
use db::Repository;
use discord::{Data, create_framework};
use error::AppError;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;
    logging::init();

    info!("🐙 Starting tierlist bot...");

    let pool = db::connect(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!(database_url = %config.database_url, "💾 Database ready");

    let token = config.discord_token.clone();
    let framework = create_framework(Data::new(config, Repository::new(pool)));

    let intents = serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::GUILD_MEMBERS;
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    client.start().await?;

    Ok(())
}
