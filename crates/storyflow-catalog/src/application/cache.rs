//! In-memory catalog views built from a [`CatalogSource`].
//!
//! [`CatalogCache`] holds stories, media, rewards and characters for a whole
//! session. [`StepSequence`] holds the ordered steps of one story and is
//! rebuilt on every story selection.

use std::collections::HashMap;

use serde::Serialize;
use storyflow_core::error::DomainError;
use storyflow_core::ids::{CharacterId, MediaId, RewardId, StepId, StoryId};
use tracing::{debug, warn};

use crate::application::source::CatalogSource;
use crate::domain::coercion;
use crate::domain::media::MediaResource;
use crate::domain::records::{CharacterRecord, MediaRecord, RewardRecord, StepRecord, StoryRecord};
use crate::domain::reward::{Character, Reward};
use crate::domain::step::FlowStep;
use crate::domain::story::Story;

fn load_error(what: &str, err: DomainError) -> DomainError {
    match err {
        DomainError::CatalogLoad(_) => err,
        other => DomainError::CatalogLoad(format!("failed to load {what}: {other}")),
    }
}

/// A media resource excluded from the cache because its metadata did not decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedMedia {
    /// The excluded resource.
    pub media_id: MediaId,
    /// Why it was excluded.
    pub reason: String,
}

/// Read-only catalog shared by every session.
#[derive(Debug, Clone, Default)]
pub struct CatalogCache {
    stories: Vec<Story>,
    media: HashMap<MediaId, MediaResource>,
    rejected_media: Vec<RejectedMedia>,
    rewards: HashMap<RewardId, Reward>,
    characters: HashMap<CharacterId, Character>,
}

impl CatalogCache {
    /// Fetches and coerces the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CatalogLoad` if any fetch fails. Nothing is
    /// partially cached.
    pub async fn load(source: &dyn CatalogSource) -> Result<Self, DomainError> {
        let stories = source
            .fetch_stories()
            .await
            .map_err(|e| load_error("stories", e))?;
        let media = source
            .fetch_media_resources()
            .await
            .map_err(|e| load_error("media resources", e))?;
        let rewards = source
            .fetch_rewards()
            .await
            .map_err(|e| load_error("rewards", e))?;
        let characters = source
            .fetch_characters()
            .await
            .map_err(|e| load_error("characters", e))?;

        let cache = Self::from_records(stories, media, rewards, characters);
        debug!(
            stories = cache.stories.len(),
            media = cache.media.len(),
            rejected_media = cache.rejected_media.len(),
            "catalog loaded"
        );
        Ok(cache)
    }

    /// Builds a cache from raw rows.
    ///
    /// Media whose metadata fails to decode is recorded in
    /// [`rejected_media`](Self::rejected_media) instead of failing the load.
    #[must_use]
    pub fn from_records(
        stories: Vec<StoryRecord>,
        media: Vec<MediaRecord>,
        rewards: Vec<RewardRecord>,
        characters: Vec<CharacterRecord>,
    ) -> Self {
        let mut stories: Vec<Story> = stories.into_iter().map(coercion::coerce_story).collect();
        stories.sort_by_key(|story| (story.order_index, story.id));

        let mut accepted = HashMap::new();
        let mut rejected_media = Vec::new();
        for record in media {
            let media_id = MediaId(record.id);
            match coercion::coerce_media(record) {
                Ok(resource) => {
                    accepted.insert(media_id, resource);
                }
                Err(err) => {
                    warn!(media_id = %media_id, error = %err, "media resource rejected");
                    rejected_media.push(RejectedMedia {
                        media_id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        Self {
            stories,
            media: accepted,
            rejected_media,
            rewards: rewards
                .into_iter()
                .map(coercion::coerce_reward)
                .map(|reward| (reward.id, reward))
                .collect(),
            characters: characters
                .into_iter()
                .map(coercion::coerce_character)
                .map(|character| (character.id, character))
                .collect(),
        }
    }

    /// Stories in hub order (`order_index`, then id).
    #[must_use]
    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    #[must_use]
    pub fn story(&self, id: StoryId) -> Option<&Story> {
        self.stories.iter().find(|story| story.id == id)
    }

    #[must_use]
    pub fn media(&self, id: MediaId) -> Option<&MediaResource> {
        self.media.get(&id)
    }

    /// Resources excluded at load time.
    #[must_use]
    pub fn rejected_media(&self) -> &[RejectedMedia] {
        &self.rejected_media
    }

    #[must_use]
    pub fn reward(&self, id: RewardId) -> Option<&Reward> {
        self.rewards.get(&id)
    }

    #[must_use]
    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(&id)
    }
}

/// The ordered steps of one story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSequence {
    story_id: StoryId,
    steps: Vec<FlowStep>,
}

impl StepSequence {
    /// Fetches and coerces the steps of `story_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CatalogLoad` if the fetch fails, a row does not
    /// coerce, or the story has no steps.
    pub async fn load(source: &dyn CatalogSource, story_id: StoryId) -> Result<Self, DomainError> {
        let records = source
            .fetch_steps_by_story(story_id)
            .await
            .map_err(|e| load_error("steps", e))?;
        Self::from_records(story_id, records)
    }

    /// Coerces raw rows into a sequence.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CatalogLoad` if a row does not coerce or the
    /// story has no steps.
    pub fn from_records(story_id: StoryId, records: Vec<StepRecord>) -> Result<Self, DomainError> {
        let steps = records
            .into_iter()
            .map(coercion::coerce_step)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                DomainError::CatalogLoad(format!("story {story_id} has a malformed step: {e}"))
            })?;
        Self::from_steps(story_id, steps)
    }

    /// Orders already-typed steps, dropping any that belong to another story.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CatalogLoad` if no step belongs to `story_id`.
    pub fn from_steps(story_id: StoryId, steps: Vec<FlowStep>) -> Result<Self, DomainError> {
        let mut steps: Vec<FlowStep> = steps
            .into_iter()
            .filter(|step| {
                let own = step.story_id == story_id;
                if !own {
                    warn!(story_id = %story_id, step_id = %step.id, "step belongs to another story");
                }
                own
            })
            .collect();
        if steps.is_empty() {
            return Err(DomainError::CatalogLoad(format!(
                "story {story_id} has no steps"
            )));
        }
        steps.sort_by_key(|step| (step.order_index, step.id));
        if steps[0].order_index != 0 {
            warn!(story_id = %story_id, "story has no entry step at order 0");
        }
        Ok(Self { story_id, steps })
    }

    #[must_use]
    pub fn story_id(&self) -> StoryId {
        self.story_id
    }

    #[must_use]
    pub fn steps(&self) -> &[FlowStep] {
        &self.steps
    }

    /// The entry step (lowest `order_index`).
    #[must_use]
    pub fn entry(&self) -> &FlowStep {
        &self.steps[0]
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FlowStep> {
        self.steps.get(index)
    }

    /// Index of the step with id `step_id`.
    #[must_use]
    pub fn position_of(&self, step_id: StepId) -> Option<usize> {
        self.steps.iter().position(|step| step.id == step_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false; a sequence holds at least its entry step.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;
    use storyflow_core::error::DomainError;
    use storyflow_core::ids::{MediaId, StepId, StoryId};

    use super::*;

    struct FakeSource {
        fail_media: bool,
    }

    fn step(id: i64, story_id: i64, order_index: i32, step_type: &str) -> StepRecord {
        StepRecord {
            id,
            story_id,
            order_index,
            step_type: step_type.to_owned(),
            content: None,
            reward_id: None,
            character_id: None,
            media_resource_id: None,
            next_step_id: None,
            decision_options: None,
        }
    }

    #[async_trait]
    impl CatalogSource for FakeSource {
        async fn fetch_stories(&self) -> Result<Vec<StoryRecord>, DomainError> {
            Ok(vec![
                StoryRecord {
                    id: 2,
                    title: "Second".into(),
                    description: String::new(),
                    dependency_story_id: Some(1),
                    order_index: Some(2),
                    image_resource_id: None,
                },
                StoryRecord {
                    id: 1,
                    title: "First".into(),
                    description: String::new(),
                    dependency_story_id: None,
                    order_index: Some(1),
                    image_resource_id: None,
                },
            ])
        }

        async fn fetch_steps_by_story(
            &self,
            story_id: StoryId,
        ) -> Result<Vec<StepRecord>, DomainError> {
            match story_id.get() {
                1 => Ok(vec![
                    step(12, 1, 2, "final"),
                    step(10, 1, 0, "narrative"),
                    step(11, 1, 1, "decision"),
                ]),
                2 => Ok(vec![step(20, 2, 0, "cutscene")]),
                _ => Ok(Vec::new()),
            }
        }

        async fn fetch_media_resources(&self) -> Result<Vec<MediaRecord>, DomainError> {
            if self.fail_media {
                return Err(DomainError::Infrastructure("connection reset".into()));
            }
            Ok(vec![
                MediaRecord {
                    id: 1,
                    kind: "video".into(),
                    file: "intro.mp4".into(),
                    metadata: None,
                },
                MediaRecord {
                    id: 2,
                    kind: "3d_model".into(),
                    file: "plaza.glb".into(),
                    metadata: Some(json!([
                        { "meshName": "a", "contentType": "image" },
                        { "meshName": "a", "contentType": "image" }
                    ])),
                },
            ])
        }

        async fn fetch_rewards(&self) -> Result<Vec<RewardRecord>, DomainError> {
            Ok(Vec::new())
        }

        async fn fetch_characters(&self) -> Result<Vec<CharacterRecord>, DomainError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_load_orders_stories_and_rejects_bad_media() {
        // Arrange
        let source = FakeSource { fail_media: false };

        // Act
        let cache = CatalogCache::load(&source).await.unwrap();

        // Assert
        let ids: Vec<_> = cache.stories().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![StoryId(1), StoryId(2)]);
        assert!(cache.media(MediaId(1)).is_some());
        assert!(cache.media(MediaId(2)).is_none());
        assert_eq!(cache.rejected_media().len(), 1);
        assert_eq!(cache.rejected_media()[0].media_id, MediaId(2));
    }

    #[tokio::test]
    async fn test_load_maps_fetch_failure_to_catalog_load() {
        let source = FakeSource { fail_media: true };
        let result = CatalogCache::load(&source).await;
        match result {
            Err(DomainError::CatalogLoad(msg)) => assert!(msg.contains("media resources")),
            other => panic!("expected CatalogLoad, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_step_sequence_sorts_by_order_index() {
        let source = FakeSource { fail_media: false };
        let sequence = StepSequence::load(&source, StoryId(1)).await.unwrap();
        assert_eq!(sequence.entry().id, StepId(10));
        assert_eq!(sequence.position_of(StepId(12)), Some(2));
        assert_eq!(sequence.len(), 3);
    }

    #[tokio::test]
    async fn test_step_sequence_rejects_malformed_and_empty_stories() {
        let source = FakeSource { fail_media: false };
        assert!(matches!(
            StepSequence::load(&source, StoryId(2)).await,
            Err(DomainError::CatalogLoad(_))
        ));
        assert!(matches!(
            StepSequence::load(&source, StoryId(3)).await,
            Err(DomainError::CatalogLoad(_))
        ));
    }

    #[test]
    fn test_from_steps_drops_steps_of_other_stories() {
        let steps = vec![
            coercion::coerce_step(step(1, 1, 0, "narrative")).unwrap(),
            coercion::coerce_step(step(2, 5, 1, "final")).unwrap(),
        ];
        let sequence = StepSequence::from_steps(StoryId(1), steps).unwrap();
        assert_eq!(sequence.len(), 1);
    }
}
