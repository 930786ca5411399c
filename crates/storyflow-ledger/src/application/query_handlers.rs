//! Query handlers for the Reward Ledger context.

use serde::Serialize;
use storyflow_core::error::DomainError;
use storyflow_core::ids::PlayerId;

use crate::application::ports::PlayerStateStore;
use crate::domain::achievements::Achievement;
use crate::domain::stats::PlayerStats;

/// Read-only progression summary for dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub player_id: PlayerId,
    pub level: i64,
    pub xp_total: i64,
    /// XP still missing for the next level.
    pub xp_to_next_level: i64,
    pub stories_completed: i64,
    pub known_characters: usize,
    pub visited_locations: usize,
    pub achievements: Vec<Achievement>,
    /// Sum of item quantities.
    pub inventory_size: u64,
}

impl From<&PlayerStats> for DashboardSummary {
    fn from(stats: &PlayerStats) -> Self {
        Self {
            player_id: stats.player_id,
            level: stats.level,
            xp_total: stats.xp_total,
            xp_to_next_level: (stats.xp_for_next_level() - stats.xp_total).max(0),
            stories_completed: stats.stories_completed,
            known_characters: stats.known_characters.len(),
            visited_locations: stats.visited_locations.len(),
            achievements: stats.unlocked_achievements.clone(),
            inventory_size: stats.inventory.iter().map(|i| u64::from(i.quantity)).sum(),
        }
    }
}

/// Builds the dashboard summary for a player. Unknown players get the summary
/// of a fresh profile.
///
/// # Errors
///
/// Returns the store's error if the read fails.
pub async fn get_dashboard(
    player_id: PlayerId,
    store: &dyn PlayerStateStore,
) -> Result<DashboardSummary, DomainError> {
    let stats = store
        .get_player_stats(player_id)
        .await?
        .unwrap_or_else(|| PlayerStats::new(player_id));
    Ok(DashboardSummary::from(&stats))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use storyflow_core::ids::RewardId;
    use uuid::Uuid;

    use super::*;
    use crate::domain::stats::InventoryItem;

    struct SingleProfile(Option<PlayerStats>);

    #[async_trait]
    impl PlayerStateStore for SingleProfile {
        async fn get_player_stats(
            &self,
            _player_id: PlayerId,
        ) -> Result<Option<PlayerStats>, DomainError> {
            Ok(self.0.clone())
        }

        async fn put_player_stats(
            &self,
            _stats: &PlayerStats,
            _expected_version: i64,
        ) -> Result<(), DomainError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_get_dashboard_summarizes_stats() {
        // Arrange
        let player_id = PlayerId(Uuid::new_v4());
        let mut stats = PlayerStats::new(player_id);
        stats.apply_xp(150);
        stats.add_item(InventoryItem {
            reward_id: RewardId(7),
            name: "Map".into(),
            description: None,
            kind: None,
            quantity: 3,
            story_id: None,
            acquired_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        });
        let store = SingleProfile(Some(stats));

        // Act
        let summary = get_dashboard(player_id, &store).await.unwrap();

        // Assert
        assert_eq!(summary.level, 2);
        assert_eq!(summary.xp_to_next_level, 250);
        assert_eq!(summary.inventory_size, 3);
    }

    #[tokio::test]
    async fn test_get_dashboard_for_unknown_player_is_fresh_profile() {
        let player_id = PlayerId(Uuid::new_v4());
        let summary = get_dashboard(player_id, &SingleProfile(None)).await.unwrap();
        assert_eq!(summary.level, 1);
        assert_eq!(summary.xp_total, 0);
        assert_eq!(summary.xp_to_next_level, 100);
    }
}
