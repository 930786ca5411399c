//! In-memory implementation of the `PlayerStateStore` trait.

use std::collections::HashMap;

use async_trait::async_trait;
use storyflow_core::error::DomainError;
use storyflow_core::ids::PlayerId;
use storyflow_ledger::application::ports::PlayerStateStore;
use storyflow_ledger::domain::stats::PlayerStats;
use tokio::sync::RwLock;

/// Version-checked player profiles held in process memory. Everything is lost
/// on restart.
#[derive(Debug, Default)]
pub struct InMemoryPlayerStateStore {
    profiles: RwLock<HashMap<PlayerId, PlayerStats>>,
}

impl InMemoryPlayerStateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlayerStateStore for InMemoryPlayerStateStore {
    async fn get_player_stats(
        &self,
        player_id: PlayerId,
    ) -> Result<Option<PlayerStats>, DomainError> {
        Ok(self.profiles.read().await.get(&player_id).cloned())
    }

    async fn put_player_stats(
        &self,
        stats: &PlayerStats,
        expected_version: i64,
    ) -> Result<(), DomainError> {
        let mut profiles = self.profiles.write().await;
        let actual = profiles.get(&stats.player_id).map_or(0, |s| s.version);
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                player_id: stats.player_id.to_string(),
                expected: expected_version,
                actual,
            });
        }
        profiles.insert(stats.player_id, stats.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[tokio::test]
    async fn test_first_write_expects_version_zero() {
        // Arrange
        let store = InMemoryPlayerStateStore::new();
        let mut stats = PlayerStats::new(PlayerId(Uuid::new_v4()));
        stats.version = 1;

        // Act
        store.put_player_stats(&stats, 0).await.unwrap();

        // Assert
        let loaded = store.get_player_stats(stats.player_id).await.unwrap();
        assert_eq!(loaded, Some(stats));
    }

    #[tokio::test]
    async fn test_stale_version_is_a_conflict() {
        let store = InMemoryPlayerStateStore::new();
        let mut stats = PlayerStats::new(PlayerId(Uuid::new_v4()));
        stats.version = 1;
        store.put_player_stats(&stats, 0).await.unwrap();

        let result = store.put_player_stats(&stats, 0).await;

        match result {
            Err(DomainError::ConcurrencyConflict { expected, actual, .. }) => {
                assert_eq!(expected, 0);
                assert_eq!(actual, 1);
            }
            other => panic!("expected ConcurrencyConflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_player_reads_none() {
        let store = InMemoryPlayerStateStore::new();

        let loaded = store.get_player_stats(PlayerId(Uuid::new_v4())).await.unwrap();

        assert!(loaded.is_none());
    }
}
