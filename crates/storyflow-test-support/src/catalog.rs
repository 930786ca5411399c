//! Test catalog sources — `CatalogSource` implementations for tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use storyflow_catalog::application::source::CatalogSource;
use storyflow_catalog::application::yaml_source::CatalogDocument;
use storyflow_catalog::domain::records::{
    CharacterRecord, MediaRecord, RewardRecord, StepRecord, StoryRecord,
};
use storyflow_core::error::DomainError;
use storyflow_core::ids::StoryId;

/// A catalog source serving a [`CatalogDocument`] from memory. Records every
/// step fetch and can be told to fail step fetches for chosen stories.
#[derive(Debug, Default)]
pub struct InMemoryCatalogSource {
    document: CatalogDocument,
    failing_stories: Mutex<HashSet<StoryId>>,
    step_fetches: Mutex<Vec<StoryId>>,
}

impl InMemoryCatalogSource {
    #[must_use]
    pub fn new(document: CatalogDocument) -> Self {
        Self {
            document,
            ..Self::default()
        }
    }

    /// Makes `fetch_steps_by_story` fail for `story_id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn fail_steps_for(&self, story_id: StoryId) {
        self.failing_stories.lock().unwrap().insert(story_id);
    }

    /// Makes `fetch_steps_by_story` succeed again for `story_id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn heal_steps_for(&self, story_id: StoryId) {
        self.failing_stories.lock().unwrap().remove(&story_id);
    }

    /// Returns every story whose steps were fetched, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn step_fetches(&self) -> Vec<StoryId> {
        self.step_fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalogSource {
    async fn fetch_stories(&self) -> Result<Vec<StoryRecord>, DomainError> {
        Ok(self.document.stories.clone())
    }

    async fn fetch_steps_by_story(&self, story_id: StoryId) -> Result<Vec<StepRecord>, DomainError> {
        self.step_fetches.lock().unwrap().push(story_id);
        if self.failing_stories.lock().unwrap().contains(&story_id) {
            return Err(DomainError::Infrastructure("connection refused".into()));
        }
        Ok(self
            .document
            .steps
            .iter()
            .filter(|step| step.story_id == story_id.get())
            .cloned()
            .collect())
    }

    async fn fetch_media_resources(&self) -> Result<Vec<MediaRecord>, DomainError> {
        Ok(self.document.media.clone())
    }

    async fn fetch_rewards(&self) -> Result<Vec<RewardRecord>, DomainError> {
        Ok(self.document.rewards.clone())
    }

    async fn fetch_characters(&self) -> Result<Vec<CharacterRecord>, DomainError> {
        Ok(self.document.characters.clone())
    }
}

/// A catalog source that always returns an infrastructure error. Useful for
/// testing catalog load failures.
#[derive(Debug)]
pub struct FailingCatalogSource;

#[async_trait]
impl CatalogSource for FailingCatalogSource {
    async fn fetch_stories(&self) -> Result<Vec<StoryRecord>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn fetch_steps_by_story(&self, _story_id: StoryId) -> Result<Vec<StepRecord>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn fetch_media_resources(&self) -> Result<Vec<MediaRecord>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn fetch_rewards(&self) -> Result<Vec<RewardRecord>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn fetch_characters(&self) -> Result<Vec<CharacterRecord>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
