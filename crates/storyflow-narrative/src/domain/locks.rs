//! Story lock resolution.

use serde::Serialize;
use storyflow_catalog::application::cache::CatalogCache;
use storyflow_catalog::domain::story::Story;
use storyflow_core::ids::StoryId;
use tracing::warn;

/// Why a story cannot be entered yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryLock {
    /// The locked story.
    pub story_id: StoryId,
    /// The story that has to be completed first.
    pub required_story_id: StoryId,
    /// Title of the required story, if it is in the catalog.
    pub required_story_title: Option<String>,
}

/// One hub entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HubEntry {
    pub story_id: StoryId,
    pub title: String,
    pub description: String,
    pub order_index: i32,
    pub completed: bool,
    pub lock: Option<StoryLock>,
}

/// True iff `story` has a prerequisite missing from `visited`.
#[must_use]
pub fn is_locked(story: &Story, visited: &[StoryId]) -> bool {
    story
        .dependency_story_id
        .is_some_and(|dependency| !visited.contains(&dependency))
}

/// The lock on `story`, with its prerequisite resolved against `catalog`.
#[must_use]
pub fn lock_for(story: &Story, catalog: &CatalogCache, visited: &[StoryId]) -> Option<StoryLock> {
    if !is_locked(story, visited) {
        return None;
    }
    let required_story_id = story.dependency_story_id?;
    let required = catalog.story(required_story_id);
    if required.is_none() {
        warn!(
            story_id = %story.id,
            required_story_id = %required_story_id,
            "story depends on a story missing from the catalog"
        );
    }
    Some(StoryLock {
        story_id: story.id,
        required_story_id,
        required_story_title: required.map(|s| s.title.clone()),
    })
}

/// Every story in hub order with its lock state.
#[must_use]
pub fn hub_listing(catalog: &CatalogCache, visited: &[StoryId]) -> Vec<HubEntry> {
    catalog
        .stories()
        .iter()
        .map(|story| HubEntry {
            story_id: story.id,
            title: story.title.clone(),
            description: story.description.clone(),
            order_index: story.order_index,
            completed: visited.contains(&story.id),
            lock: lock_for(story, catalog, visited),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use storyflow_catalog::domain::records::StoryRecord;

    use super::*;

    fn story(id: i64, dependency: Option<i64>, order_index: i32) -> StoryRecord {
        StoryRecord {
            id,
            title: format!("Story {id}"),
            description: String::new(),
            dependency_story_id: dependency,
            order_index: Some(order_index),
            image_resource_id: None,
        }
    }

    fn catalog() -> CatalogCache {
        CatalogCache::from_records(
            vec![story(1, None, 1), story(2, Some(1), 2), story(3, Some(42), 3)],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        )
    }

    #[test]
    fn test_story_unlocks_once_dependency_is_visited() {
        // Arrange
        let catalog = catalog();
        let dependent = catalog.story(StoryId(2)).unwrap();

        // Act / Assert
        assert!(is_locked(dependent, &[]));
        let lock = lock_for(dependent, &catalog, &[]).unwrap();
        assert_eq!(lock.required_story_id, StoryId(1));
        assert_eq!(lock.required_story_title.as_deref(), Some("Story 1"));

        assert!(!is_locked(dependent, &[StoryId(1)]));
        assert!(lock_for(dependent, &catalog, &[StoryId(1)]).is_none());
    }

    #[test]
    fn test_story_without_dependency_is_never_locked() {
        let catalog = catalog();
        assert!(!is_locked(catalog.story(StoryId(1)).unwrap(), &[]));
    }

    #[test]
    fn test_dangling_dependency_stays_locked() {
        let catalog = catalog();
        let lock = lock_for(catalog.story(StoryId(3)).unwrap(), &catalog, &[]).unwrap();
        assert_eq!(lock.required_story_id, StoryId(42));
        assert!(lock.required_story_title.is_none());
    }

    #[test]
    fn test_hub_listing_orders_and_marks_completion() {
        let listing = hub_listing(&catalog(), &[StoryId(1)]);
        let ids: Vec<_> = listing.iter().map(|e| e.story_id).collect();
        assert_eq!(ids, vec![StoryId(1), StoryId(2), StoryId(3)]);
        assert!(listing[0].completed);
        assert!(listing[1].lock.is_none());
        assert!(listing[2].lock.is_some());
    }
}
