//! Raw catalog rows as delivered by a [`CatalogSource`].
//!
//! These mirror the content store's columns. JSON-bearing columns stay as
//! `serde_json::Value` until [`coercion`] validates them.
//!
//! [`CatalogSource`]: crate::application::source::CatalogSource
//! [`coercion`]: super::coercion

use serde::{Deserialize, Serialize};

/// A `stories` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryRecord {
    /// Story identifier.
    pub id: i64,
    /// Display title.
    pub title: String,
    /// Hub description.
    #[serde(default)]
    pub description: String,
    /// Prerequisite story.
    #[serde(default)]
    pub dependency_story_id: Option<i64>,
    /// Hub position.
    #[serde(default)]
    pub order_index: Option<i32>,
    /// Cover image resource.
    #[serde(default)]
    pub image_resource_id: Option<i64>,
}

/// A `flow_steps` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Step identifier.
    pub id: i64,
    /// Owning story.
    pub story_id: i64,
    /// Position within the story.
    pub order_index: i32,
    /// One of `narrative`, `decision`, `final`, `app`.
    pub step_type: String,
    /// Narrative text.
    #[serde(default)]
    pub content: Option<String>,
    /// Attached reward.
    #[serde(default)]
    pub reward_id: Option<i64>,
    /// Introduced character.
    #[serde(default)]
    pub character_id: Option<i64>,
    /// Bound media resource.
    #[serde(default)]
    pub media_resource_id: Option<i64>,
    /// Successor id; a story id on `final` steps.
    #[serde(default)]
    pub next_step_id: Option<i64>,
    /// Decision options in any of the accepted encodings.
    #[serde(default)]
    pub decision_options: Option<serde_json::Value>,
}

/// A `media_resources` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Resource identifier.
    pub id: i64,
    /// Asset kind.
    pub kind: String,
    /// Asset URL.
    pub file: String,
    /// Kind-specific metadata, either JSON or a string holding JSON.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// A `rewards` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRecord {
    /// Reward identifier.
    pub id: i64,
    /// Item name.
    pub name: String,
    /// Item description.
    #[serde(default)]
    pub description: Option<String>,
    /// Item category.
    #[serde(default)]
    pub kind: Option<String>,
    /// XP value.
    #[serde(default)]
    pub value: i64,
    /// Story of origin.
    #[serde(default)]
    pub origin_story_id: Option<i64>,
}

/// A `characters` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    /// Character identifier.
    pub id: i64,
    /// Character name.
    pub name: String,
    /// Character description.
    #[serde(default)]
    pub description: Option<String>,
}
