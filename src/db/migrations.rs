use sqlx::SqlitePool;
use tracing::info;

use crate::error::AppError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS profiles (
    user_id INTEGER PRIMARY KEY,
    ign TEXT NOT NULL,
    account_type TEXT NOT NULL,
    region TEXT NOT NULL,
    created_at INTEGER NOT NULL DEFAULT (unixepoch()),
    updated_at INTEGER NOT NULL DEFAULT (unixepoch())
);

CREATE TABLE IF NOT EXISTS tier_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tester_id INTEGER NOT NULL,
    player_id INTEGER NOT NULL,
    ign TEXT NOT NULL,
    gamemode TEXT NOT NULL,
    region TEXT NOT NULL,
    previous_tier TEXT NOT NULL,
    new_tier TEXT NOT NULL,
    recorded_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS guilds (
    id INTEGER PRIMARY KEY,
    results_channel_id INTEGER,
    created_at INTEGER NOT NULL DEFAULT (unixepoch())
);

CREATE INDEX IF NOT EXISTS idx_tier_results_player ON tier_results(player_id, gamemode);
"#;

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    info!("🗄️ Database migrations completed");
    Ok(())
}
