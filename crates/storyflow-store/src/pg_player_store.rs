//! `PostgreSQL` implementation of the `PlayerStateStore` trait.

use async_trait::async_trait;
use sqlx::PgPool;
use storyflow_core::error::DomainError;
use storyflow_core::ids::PlayerId;
use storyflow_ledger::application::ports::PlayerStateStore;
use storyflow_ledger::domain::stats::PlayerStats;
use tracing::instrument;

use crate::rows::PlayerProfileRow;

/// PostgreSQL-backed player profile store with optimistic concurrency on
/// `version`.
#[derive(Debug, Clone)]
pub struct PgPlayerStateStore {
    pool: PgPool,
}

impl PgPlayerStateStore {
    /// Creates a new `PgPlayerStateStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn stored_version(&self, player_id: PlayerId) -> Result<i64, DomainError> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT version FROM player_profiles WHERE player_id = $1")
                .bind(player_id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(infrastructure)?;
        Ok(version.unwrap_or(0))
    }
}

fn infrastructure(e: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(e.to_string())
}

#[async_trait]
impl PlayerStateStore for PgPlayerStateStore {
    #[instrument(skip(self), fields(player_id = %player_id))]
    async fn get_player_stats(
        &self,
        player_id: PlayerId,
    ) -> Result<Option<PlayerStats>, DomainError> {
        let row: Option<PlayerProfileRow> = sqlx::query_as(
            "SELECT player_id, level, xp_total, stories_completed, inventory, known_characters,
                    visited_locations, unlocked_achievements, visited_stories, favorite_stories,
                    version
             FROM player_profiles
             WHERE player_id = $1",
        )
        .bind(player_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(row.map(PlayerStats::from))
    }

    #[instrument(skip(self, stats), fields(player_id = %stats.player_id, version = stats.version))]
    async fn put_player_stats(
        &self,
        stats: &PlayerStats,
        expected_version: i64,
    ) -> Result<(), DomainError> {
        let row = PlayerProfileRow::from(stats);
        let sql = if expected_version == 0 {
            "INSERT INTO player_profiles (player_id, level, xp_total, stories_completed, inventory,
                 known_characters, visited_locations, unlocked_achievements, visited_stories,
                 favorite_stories, version, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW())
             ON CONFLICT (player_id) DO NOTHING"
        } else {
            "UPDATE player_profiles
             SET level = $2, xp_total = $3, stories_completed = $4, inventory = $5,
                 known_characters = $6, visited_locations = $7, unlocked_achievements = $8,
                 visited_stories = $9, favorite_stories = $10, version = $11, updated_at = NOW()
             WHERE player_id = $1 AND version = $12"
        };
        let query = sqlx::query(sql)
            .bind(row.player_id)
            .bind(row.level)
            .bind(row.xp_total)
            .bind(row.stories_completed)
            .bind(row.inventory)
            .bind(row.known_characters)
            .bind(row.visited_locations)
            .bind(row.unlocked_achievements)
            .bind(row.visited_stories)
            .bind(row.favorite_stories)
            .bind(row.version);
        let query = if expected_version == 0 {
            query
        } else {
            query.bind(expected_version)
        };
        let result = query.execute(&self.pool).await.map_err(infrastructure)?;

        if result.rows_affected() == 0 {
            let actual = self.stored_version(stats.player_id).await?;
            return Err(DomainError::ConcurrencyConflict {
                player_id: stats.player_id.to_string(),
                expected: expected_version,
                actual,
            });
        }
        Ok(())
    }
}
