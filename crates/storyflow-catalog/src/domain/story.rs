//! Story catalog entries.

use serde::Serialize;
use storyflow_core::ids::{MediaId, StoryId};

/// A top-level narrative unit. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Story {
    /// Story identifier.
    pub id: StoryId,
    /// Display title.
    pub title: String,
    /// Short description shown in the hub.
    pub description: String,
    /// Story that must be completed before this one unlocks.
    pub dependency_story_id: Option<StoryId>,
    /// Position in the hub listing.
    pub order_index: i32,
    /// Cover image resource.
    pub image_resource_id: Option<MediaId>,
}
