//! A [`CatalogSource`] backed by a YAML catalog file.
//!
//! Used for local runs without a database. The document lists each table as a
//! sequence of rows in the same shape the database adapter produces:
//!
//! ```yaml
//! stories:
//!   - { id: 1, title: "The Plaza", order_index: 1 }
//! steps:
//!   - { id: 10, story_id: 1, order_index: 0, step_type: narrative, next_step_id: 11 }
//! media: []
//! rewards: []
//! characters: []
//! ```

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storyflow_core::error::DomainError;
use storyflow_core::ids::StoryId;

use crate::application::source::CatalogSource;
use crate::domain::records::{CharacterRecord, MediaRecord, RewardRecord, StepRecord, StoryRecord};

/// Every catalog table, as rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub stories: Vec<StoryRecord>,
    #[serde(default)]
    pub steps: Vec<StepRecord>,
    #[serde(default)]
    pub media: Vec<MediaRecord>,
    #[serde(default)]
    pub rewards: Vec<RewardRecord>,
    #[serde(default)]
    pub characters: Vec<CharacterRecord>,
}

/// Serves a parsed [`CatalogDocument`].
#[derive(Debug, Clone)]
pub struct YamlCatalogSource {
    document: CatalogDocument,
}

impl YamlCatalogSource {
    /// Parses a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CatalogLoad` if the text is not a valid catalog.
    pub fn from_yaml(text: &str) -> Result<Self, DomainError> {
        let document = serde_yaml::from_str(text)
            .map_err(|e| DomainError::CatalogLoad(format!("invalid catalog file: {e}")))?;
        Ok(Self { document })
    }

    /// Reads and parses a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CatalogLoad` if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DomainError::CatalogLoad(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&text)
    }

    #[must_use]
    pub fn document(&self) -> &CatalogDocument {
        &self.document
    }
}

impl From<CatalogDocument> for YamlCatalogSource {
    fn from(document: CatalogDocument) -> Self {
        Self { document }
    }
}

#[async_trait]
impl CatalogSource for YamlCatalogSource {
    async fn fetch_stories(&self) -> Result<Vec<StoryRecord>, DomainError> {
        Ok(self.document.stories.clone())
    }

    async fn fetch_steps_by_story(&self, story_id: StoryId) -> Result<Vec<StepRecord>, DomainError> {
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

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
stories:
  - { id: 1, title: "The Plaza", order_index: 1 }
steps:
  - { id: 10, story_id: 1, order_index: 0, step_type: narrative, next_step_id: 11 }
  - id: 11
    story_id: 1
    order_index: 1
    step_type: decision
    decision_options: '{"options":[{"text":"go","next_step_id":12}]}'
  - { id: 20, story_id: 2, order_index: 0, step_type: final }
media:
  - id: 3
    kind: 3d_model
    file: plaza.glb
    metadata:
      - { meshName: fountain, contentType: image }
rewards:
  - { id: 7, name: Map, value: 10 }
"#;

    #[tokio::test]
    async fn test_yaml_source_serves_rows_by_story() {
        // Arrange
        let source = YamlCatalogSource::from_yaml(CATALOG).unwrap();

        // Act
        let steps = source.fetch_steps_by_story(StoryId(1)).await.unwrap();
        let rewards = source.fetch_rewards().await.unwrap();

        // Assert
        assert_eq!(steps.len(), 2);
        assert_eq!(rewards[0].value, 10);
        assert!(source.fetch_characters().await.unwrap().is_empty());
    }

    #[test]
    fn test_yaml_source_rejects_invalid_document() {
        let result = YamlCatalogSource::from_yaml("stories: 12");
        assert!(matches!(result, Err(DomainError::CatalogLoad(_))));
    }

    #[test]
    fn test_from_path_reports_missing_file() {
        let result = YamlCatalogSource::from_path("/nonexistent/catalog.yaml");
        match result {
            Err(DomainError::CatalogLoad(msg)) => assert!(msg.contains("cannot read")),
            other => panic!("expected CatalogLoad, got {other:?}"),
        }
    }
}
