//! Catalog source abstraction.

use async_trait::async_trait;
use storyflow_core::error::DomainError;
use storyflow_core::ids::StoryId;

use crate::domain::records::{CharacterRecord, MediaRecord, RewardRecord, StepRecord, StoryRecord};

/// Read-only access to authored content rows.
///
/// Implementations return rows as stored; validation happens in
/// [`CatalogCache`](super::cache::CatalogCache) and
/// [`StepSequence`](super::cache::StepSequence).
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Load every story row.
    async fn fetch_stories(&self) -> Result<Vec<StoryRecord>, DomainError>;

    /// Load the step rows of one story, in any order.
    async fn fetch_steps_by_story(&self, story_id: StoryId) -> Result<Vec<StepRecord>, DomainError>;

    /// Load every media resource row.
    async fn fetch_media_resources(&self) -> Result<Vec<MediaRecord>, DomainError>;

    /// Load every reward row.
    async fn fetch_rewards(&self) -> Result<Vec<RewardRecord>, DomainError>;

    /// Load every character row.
    async fn fetch_characters(&self) -> Result<Vec<CharacterRecord>, DomainError>;
}
