//! Database rows and their mapping to catalog records and player profiles.

use sqlx::FromRow;
use sqlx::types::Json;
use storyflow_catalog::domain::records::{
    CharacterRecord, MediaRecord, RewardRecord, StepRecord, StoryRecord,
};
use storyflow_core::ids::{PlayerId, StoryId};
use storyflow_ledger::domain::achievements::Achievement;
use storyflow_ledger::domain::stats::{InventoryItem, PlayerStats};
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct StoryRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub dependency_story_id: Option<i64>,
    pub order_index: Option<i32>,
    pub image_resource_id: Option<i64>,
}

impl From<StoryRow> for StoryRecord {
    fn from(row: StoryRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            dependency_story_id: row.dependency_story_id,
            order_index: row.order_index,
            image_resource_id: row.image_resource_id,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct StepRow {
    pub id: i64,
    pub story_id: i64,
    pub order_index: i32,
    pub step_type: String,
    pub content: Option<String>,
    pub reward_id: Option<i64>,
    pub character_id: Option<i64>,
    pub media_resource_id: Option<i64>,
    pub next_step_id: Option<i64>,
    pub decision_options: Option<serde_json::Value>,
}

impl From<StepRow> for StepRecord {
    fn from(row: StepRow) -> Self {
        Self {
            id: row.id,
            story_id: row.story_id,
            order_index: row.order_index,
            step_type: row.step_type,
            content: row.content,
            reward_id: row.reward_id,
            character_id: row.character_id,
            media_resource_id: row.media_resource_id,
            next_step_id: row.next_step_id,
            decision_options: row.decision_options,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MediaRow {
    pub id: i64,
    pub kind: String,
    pub file: String,
    pub metadata: Option<serde_json::Value>,
}

impl From<MediaRow> for MediaRecord {
    fn from(row: MediaRow) -> Self {
        Self {
            id: row.id,
            kind: row.kind,
            file: row.file,
            metadata: row.metadata,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct RewardRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub value: i64,
    pub origin_story_id: Option<i64>,
}

impl From<RewardRow> for RewardRecord {
    fn from(row: RewardRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            kind: row.kind,
            value: row.value,
            origin_story_id: row.origin_story_id,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CharacterRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl From<CharacterRow> for CharacterRecord {
    fn from(row: CharacterRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
        }
    }
}

/// A `player_profiles` row.
#[derive(Debug, Clone, FromRow)]
pub struct PlayerProfileRow {
    pub player_id: Uuid,
    pub level: i64,
    pub xp_total: i64,
    pub stories_completed: i64,
    pub inventory: Json<Vec<InventoryItem>>,
    pub known_characters: Vec<String>,
    pub visited_locations: Vec<String>,
    pub unlocked_achievements: Vec<String>,
    pub visited_stories: Vec<i64>,
    pub favorite_stories: Vec<i64>,
    pub version: i64,
}

impl From<PlayerProfileRow> for PlayerStats {
    fn from(row: PlayerProfileRow) -> Self {
        let unlocked_achievements = row
            .unlocked_achievements
            .iter()
            .filter_map(|name| {
                let achievement = Achievement::from_name(name);
                if achievement.is_none() {
                    warn!(player_id = %row.player_id, achievement = %name, "dropping unknown achievement");
                }
                achievement
            })
            .collect();
        Self {
            player_id: PlayerId(row.player_id),
            level: row.level,
            xp_total: row.xp_total,
            stories_completed: row.stories_completed,
            inventory: row.inventory.0,
            known_characters: row.known_characters,
            visited_locations: row.visited_locations,
            unlocked_achievements,
            visited_stories: row.visited_stories.into_iter().map(StoryId).collect(),
            favorite_stories: row.favorite_stories.into_iter().map(StoryId).collect(),
            version: row.version,
        }
    }
}

impl From<&PlayerStats> for PlayerProfileRow {
    fn from(stats: &PlayerStats) -> Self {
        Self {
            player_id: stats.player_id.0,
            level: stats.level,
            xp_total: stats.xp_total,
            stories_completed: stats.stories_completed,
            inventory: Json(stats.inventory.clone()),
            known_characters: stats.known_characters.clone(),
            visited_locations: stats.visited_locations.clone(),
            unlocked_achievements: stats
                .unlocked_achievements
                .iter()
                .map(|a| a.as_str().to_owned())
                .collect(),
            visited_stories: stats.visited_stories.iter().map(|id| id.get()).collect(),
            favorite_stories: stats.favorite_stories.iter().map(|id| id.get()).collect(),
            version: stats.version,
        }
    }
}
