//! Test player stores — `PlayerStateStore` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use storyflow_core::error::DomainError;
use storyflow_core::ids::PlayerId;
use storyflow_ledger::application::ports::PlayerStateStore;
use storyflow_ledger::domain::stats::PlayerStats;

/// An in-memory, version-checked player store that records every successful
/// write.
#[derive(Debug, Default)]
pub struct RecordingPlayerStore {
    profiles: Mutex<HashMap<PlayerId, PlayerStats>>,
    writes: Mutex<Vec<PlayerStats>>,
}

impl RecordingPlayerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a stored profile, bypassing the version check.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn seed(&self, stats: PlayerStats) {
        self.profiles.lock().unwrap().insert(stats.player_id, stats);
    }

    /// Returns a snapshot of every profile that was written, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn writes(&self) -> Vec<PlayerStats> {
        self.writes.lock().unwrap().clone()
    }

    /// Returns the stored profile for `player_id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn stored(&self, player_id: PlayerId) -> Option<PlayerStats> {
        self.profiles.lock().unwrap().get(&player_id).cloned()
    }
}

#[async_trait]
impl PlayerStateStore for RecordingPlayerStore {
    async fn get_player_stats(
        &self,
        player_id: PlayerId,
    ) -> Result<Option<PlayerStats>, DomainError> {
        Ok(self.profiles.lock().unwrap().get(&player_id).cloned())
    }

    async fn put_player_stats(
        &self,
        stats: &PlayerStats,
        expected_version: i64,
    ) -> Result<(), DomainError> {
        let mut profiles = self.profiles.lock().unwrap();
        let actual = profiles.get(&stats.player_id).map_or(0, |s| s.version);
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                player_id: stats.player_id.to_string(),
                expected: expected_version,
                actual,
            });
        }
        profiles.insert(stats.player_id, stats.clone());
        self.writes.lock().unwrap().push(stats.clone());
        Ok(())
    }
}

/// A player store whose reads find nothing and whose writes always fail.
/// Useful for testing that transitions survive ledger failures.
#[derive(Debug)]
pub struct FailingPlayerStore;

#[async_trait]
impl PlayerStateStore for FailingPlayerStore {
    async fn get_player_stats(
        &self,
        _player_id: PlayerId,
    ) -> Result<Option<PlayerStats>, DomainError> {
        Ok(None)
    }

    async fn put_player_stats(
        &self,
        _stats: &PlayerStats,
        _expected_version: i64,
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("write rejected".into()))
    }
}
