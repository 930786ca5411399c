//! Player progression state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storyflow_core::ids::{PlayerId, RewardId, StoryId};

use super::achievements::Achievement;
use super::level::{level_for_xp, xp_for_next_level};

/// One inventory row. Rows are unique per reward; regrants bump `quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// The catalog reward this row holds.
    pub reward_id: RewardId,
    /// Item name, copied from the reward.
    pub name: String,
    /// Item description, copied from the reward.
    pub description: Option<String>,
    /// Item category, copied from the reward.
    pub kind: Option<String>,
    /// Times the reward has been granted.
    pub quantity: u32,
    /// Story the item was first granted in.
    pub story_id: Option<StoryId>,
    /// First grant time.
    pub acquired_at: DateTime<Utc>,
}

/// A player's progression profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub player_id: PlayerId,
    pub level: i64,
    pub xp_total: i64,
    pub stories_completed: i64,
    pub inventory: Vec<InventoryItem>,
    /// Character names, in the order they were met.
    pub known_characters: Vec<String>,
    pub visited_locations: Vec<String>,
    pub unlocked_achievements: Vec<Achievement>,
    pub visited_stories: Vec<StoryId>,
    pub favorite_stories: Vec<StoryId>,
    /// Write version for optimistic concurrency; 0 for a profile never stored.
    pub version: i64,
}

impl PlayerStats {
    /// A fresh level-1 profile.
    #[must_use]
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            level: 1,
            xp_total: 0,
            stories_completed: 0,
            inventory: Vec::new(),
            known_characters: Vec::new(),
            visited_locations: Vec::new(),
            unlocked_achievements: Vec::new(),
            visited_stories: Vec::new(),
            favorite_stories: Vec::new(),
            version: 0,
        }
    }

    /// Adds `delta` to the XP total and recomputes the level.
    pub fn apply_xp(&mut self, delta: i64) {
        self.xp_total = self.xp_total.saturating_add(delta);
        self.level = level_for_xp(self.xp_total);
    }

    /// XP total at which the next level is reached.
    #[must_use]
    pub fn xp_for_next_level(&self) -> i64 {
        xp_for_next_level(self.level)
    }

    #[must_use]
    pub fn inventory_item(&self, reward_id: RewardId) -> Option<&InventoryItem> {
        self.inventory.iter().find(|item| item.reward_id == reward_id)
    }

    /// Merges `item` into the inventory, returning the resulting quantity.
    pub fn add_item(&mut self, item: InventoryItem) -> u32 {
        if let Some(existing) = self
            .inventory
            .iter_mut()
            .find(|existing| existing.reward_id == item.reward_id)
        {
            existing.quantity = existing.quantity.saturating_add(item.quantity.max(1));
            return existing.quantity;
        }
        let quantity = item.quantity.max(1);
        self.inventory.push(InventoryItem { quantity, ..item });
        quantity
    }

    #[must_use]
    pub fn has_visited(&self, story_id: StoryId) -> bool {
        self.visited_stories.contains(&story_id)
    }

    /// Records a visited story. Returns `false` if it was already recorded.
    pub fn mark_story_visited(&mut self, story_id: StoryId) -> bool {
        if self.has_visited(story_id) {
            return false;
        }
        self.visited_stories.push(story_id);
        true
    }

    /// Records a known character. Returns `false` if it was already recorded.
    pub fn know_character(&mut self, name: &str) -> bool {
        if self.known_characters.iter().any(|known| known == name) {
            return false;
        }
        self.known_characters.push(name.to_owned());
        true
    }

    /// Records a visited location. Returns `false` if it was already recorded.
    pub fn visit_location(&mut self, location_id: &str) -> bool {
        if self.visited_locations.iter().any(|known| known == location_id) {
            return false;
        }
        self.visited_locations.push(location_id.to_owned());
        true
    }

    /// Unlocks every newly earned achievement and returns them.
    pub fn evaluate_achievements(&mut self) -> Vec<Achievement> {
        let unlocked: Vec<Achievement> = Achievement::ALL
            .into_iter()
            .filter(|a| !self.unlocked_achievements.contains(a) && a.is_earned(self))
            .collect();
        self.unlocked_achievements.extend(&unlocked);
        unlocked
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;

    fn item(reward_id: i64) -> InventoryItem {
        InventoryItem {
            reward_id: RewardId(reward_id),
            name: "Map".to_owned(),
            description: None,
            kind: None,
            quantity: 1,
            story_id: None,
            acquired_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_apply_xp_sums_deltas_in_any_order() {
        let deltas = [120, -40, 300, -15, 5];
        let mut forward = PlayerStats::new(PlayerId(Uuid::nil()));
        let mut backward = PlayerStats::new(PlayerId(Uuid::nil()));
        for delta in deltas {
            forward.apply_xp(delta);
        }
        for delta in deltas.iter().rev() {
            backward.apply_xp(*delta);
        }
        assert_eq!(forward.xp_total, 370);
        assert_eq!(forward.xp_total, backward.xp_total);
        assert_eq!(forward.level, 2);
    }

    #[test]
    fn test_add_item_increments_quantity_instead_of_duplicating() {
        let mut stats = PlayerStats::new(PlayerId(Uuid::nil()));
        assert_eq!(stats.add_item(item(7)), 1);
        assert_eq!(stats.add_item(item(7)), 2);
        assert_eq!(stats.inventory.len(), 1);
        assert_eq!(stats.inventory_item(RewardId(7)).unwrap().quantity, 2);
    }

    #[test]
    fn test_mark_story_visited_is_idempotent() {
        let mut stats = PlayerStats::new(PlayerId(Uuid::nil()));
        assert!(stats.mark_story_visited(StoryId(1)));
        assert!(!stats.mark_story_visited(StoryId(1)));
        assert_eq!(stats.visited_stories, vec![StoryId(1)]);
    }

    #[test]
    fn test_evaluate_achievements_unlocks_once() {
        let mut stats = PlayerStats::new(PlayerId(Uuid::nil()));
        stats.stories_completed = 1;
        assert_eq!(stats.evaluate_achievements(), vec![Achievement::FirstStory]);
        assert!(stats.evaluate_achievements().is_empty());
    }
}
