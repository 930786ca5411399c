//! Reward and character catalog entries.

use serde::Serialize;
use storyflow_core::ids::{CharacterId, RewardId, StoryId};

/// A catalog-defined grant of XP and an inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reward {
    /// Reward identifier.
    pub id: RewardId,
    /// Item name shown in the inventory.
    pub name: String,
    /// Item description.
    pub description: Option<String>,
    /// Free-form item category (badge, tool, document...).
    pub kind: Option<String>,
    /// XP granted alongside the item.
    pub xp_value: i64,
    /// Story the reward belongs to.
    pub origin_story_id: Option<StoryId>,
}

/// A character the player can get to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Character {
    /// Character identifier.
    pub id: CharacterId,
    /// Name recorded in the player's known characters.
    pub name: String,
    /// Character description.
    pub description: Option<String>,
}
