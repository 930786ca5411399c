//! Persistence port for player progression.

use async_trait::async_trait;
use storyflow_core::error::DomainError;
use storyflow_core::ids::PlayerId;

use crate::domain::stats::PlayerStats;

/// Storage for player profiles.
#[async_trait]
pub trait PlayerStateStore: Send + Sync {
    /// Load a player's profile, or `None` if it has never been written.
    async fn get_player_stats(&self, player_id: PlayerId)
    -> Result<Option<PlayerStats>, DomainError>;

    /// Store `stats` if the stored version still equals `expected_version`.
    ///
    /// A profile that does not exist yet has version 0. `stats.version` is the
    /// version being written and is always `expected_version + 1`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ConcurrencyConflict` if the stored version moved.
    async fn put_player_stats(
        &self,
        stats: &PlayerStats,
        expected_version: i64,
    ) -> Result<(), DomainError>;
}
