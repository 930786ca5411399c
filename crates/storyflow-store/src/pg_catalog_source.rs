//! `PostgreSQL` implementation of the `CatalogSource` trait.

use async_trait::async_trait;
use sqlx::PgPool;
use storyflow_catalog::application::source::CatalogSource;
use storyflow_catalog::domain::records::{
    CharacterRecord, MediaRecord, RewardRecord, StepRecord, StoryRecord,
};
use storyflow_core::error::DomainError;
use storyflow_core::ids::StoryId;
use tracing::instrument;

use crate::rows::{CharacterRow, MediaRow, RewardRow, StepRow, StoryRow};

/// PostgreSQL-backed catalog source.
#[derive(Debug, Clone)]
pub struct PgCatalogSource {
    pool: PgPool,
}

impl PgCatalogSource {
    /// Creates a new `PgCatalogSource`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn load_error(what: &'static str) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| DomainError::CatalogLoad(format!("failed to query {what}: {e}"))
}

#[async_trait]
impl CatalogSource for PgCatalogSource {
    #[instrument(skip(self))]
    async fn fetch_stories(&self) -> Result<Vec<StoryRecord>, DomainError> {
        let rows: Vec<StoryRow> = sqlx::query_as(
            "SELECT id, title, description, dependency_story_id, order_index, image_resource_id
             FROM stories",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(load_error("stories"))?;
        Ok(rows.into_iter().map(StoryRecord::from).collect())
    }

    #[instrument(skip(self), fields(story_id = %story_id))]
    async fn fetch_steps_by_story(&self, story_id: StoryId) -> Result<Vec<StepRecord>, DomainError> {
        let rows: Vec<StepRow> = sqlx::query_as(
            "SELECT id, story_id, order_index, step_type, content, reward_id, character_id,
                    media_resource_id, next_step_id, decision_options
             FROM flow_steps
             WHERE story_id = $1
             ORDER BY order_index, id",
        )
        .bind(story_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(load_error("flow steps"))?;
        Ok(rows.into_iter().map(StepRecord::from).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_media_resources(&self) -> Result<Vec<MediaRecord>, DomainError> {
        let rows: Vec<MediaRow> =
            sqlx::query_as("SELECT id, kind, file, metadata FROM media_resources")
                .fetch_all(&self.pool)
                .await
                .map_err(load_error("media resources"))?;
        Ok(rows.into_iter().map(MediaRecord::from).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_rewards(&self) -> Result<Vec<RewardRecord>, DomainError> {
        let rows: Vec<RewardRow> = sqlx::query_as(
            "SELECT id, name, description, kind, value, origin_story_id FROM rewards",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(load_error("rewards"))?;
        Ok(rows.into_iter().map(RewardRecord::from).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_characters(&self) -> Result<Vec<CharacterRecord>, DomainError> {
        let rows: Vec<CharacterRow> =
            sqlx::query_as("SELECT id, name, description FROM characters")
                .fetch_all(&self.pool)
                .await
                .map_err(load_error("characters"))?;
        Ok(rows.into_iter().map(CharacterRecord::from).collect())
    }
}
