use sqlx::SqlitePool;

use super::models::{Guild, NewResult, ProfileRow, ResultRow};
use crate::error::AppError;
use crate::tierlist::{Gamemode, PlayerProfile, Tier};

const RESULT_COLUMNS: &str = "gamemode, region, new_tier, recorded_at";

#[derive(Clone, Debug)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // === Profile operations ===

    pub async fn upsert_profile(&self, profile: &PlayerProfile) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, ign, account_type, region)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                ign = excluded.ign,
                account_type = excluded.account_type,
                region = excluded.region,
                updated_at = unixepoch()
            "#,
        )
        .bind(profile.user_id.get() as i64)
        .bind(&profile.ign)
        .bind(profile.account_type.as_str())
        .bind(profile.region.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_profile(&self, user_id: u64) -> Result<Option<PlayerProfile>, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT user_id, ign, account_type, region FROM profiles WHERE user_id = ?",
        )
        .bind(user_id as i64)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PlayerProfile::try_from).transpose()?)
    }

    // === Result log ===

    pub async fn record_result(&self, result: &NewResult<'_>) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO tier_results
                (tester_id, player_id, ign, gamemode, region, previous_tier, new_tier, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(result.tester_id as i64)
        .bind(result.player_id as i64)
        .bind(result.ign)
        .bind(result.gamemode)
        .bind(result.region)
        .bind(result.previous_tier.as_str())
        .bind(result.new_tier.as_str())
        .bind(result.recorded_at.timestamp())
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Most recently awarded tier for the player in `gamemode`, `Unranked` if never tested.
    pub async fn current_tier(&self, player_id: u64, gamemode: Gamemode) -> Result<Tier, AppError> {
        let tier = sqlx::query_scalar::<_, String>(
            r#"
            SELECT new_tier FROM tier_results
            WHERE player_id = ? AND gamemode = ?
            ORDER BY recorded_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(player_id as i64)
        .bind(gamemode.display_name())
        .fetch_optional(&self.pool)
        .await?;

        match tier {
            Some(tier) => Ok(tier.parse()?),
            None => Ok(Tier::Unranked),
        }
    }

    pub async fn get_player_results(&self, player_id: u64) -> Result<Vec<ResultRow>, AppError> {
        let results = sqlx::query_as::<_, ResultRow>(&format!(
            "SELECT {RESULT_COLUMNS} FROM tier_results WHERE player_id = ? ORDER BY recorded_at DESC, id DESC"
        ))
        .bind(player_id as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(results)
    }

    // === Guild operations ===

    pub async fn get_or_create_guild(&self, guild_id: u64) -> Result<Guild, AppError> {
        if let Some(guild) = self.get_guild(guild_id).await? {
            return Ok(guild);
        }

        sqlx::query("INSERT INTO guilds (id) VALUES (?)")
            .bind(guild_id as i64)
            .execute(&self.pool)
            .await?;

        self.get_guild(guild_id)
            .await?
            .ok_or_else(|| AppError::Database(sqlx::Error::RowNotFound))
    }

    pub async fn get_guild(&self, guild_id: u64) -> Result<Option<Guild>, AppError> {
        let guild =
            sqlx::query_as::<_, Guild>("SELECT id, results_channel_id FROM guilds WHERE id = ?")
                .bind(guild_id as i64)
                .fetch_optional(&self.pool)
                .await?;
        Ok(guild)
    }

    pub async fn set_results_channel(&self, guild_id: u64, channel_id: u64) -> Result<(), AppError> {
        self.get_or_create_guild(guild_id).await?;

        sqlx::query("UPDATE guilds SET results_channel_id = ? WHERE id = ?")
            .bind(channel_id as i64)
            .bind(guild_id as i64)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
