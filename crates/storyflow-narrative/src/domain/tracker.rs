//! Hotspot discovery for 3D scene steps.

use std::collections::BTreeSet;

use storyflow_catalog::domain::media::SceneConfig;

/// What a call to [`HotspotTracker::discover`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryResult {
    /// First discovery of this mesh; its rewards may be granted.
    New,
    /// Already discovered; nothing to grant.
    Repeat,
    /// Not an interactive hotspot of the current scene.
    NotInteractive,
}

/// The set of interactive hotspots discovered on the active step.
///
/// Only grows. Replaced, never cleared, when the active step changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HotspotTracker {
    interactive: BTreeSet<String>,
    discovered: BTreeSet<String>,
}

impl HotspotTracker {
    /// A tracker for the interactive hotspots of `scene`. Background music is
    /// not counted.
    #[must_use]
    pub fn for_scene(scene: &SceneConfig) -> Self {
        Self {
            interactive: scene.interactive().map(|h| h.mesh_name.clone()).collect(),
            discovered: BTreeSet::new(),
        }
    }

    pub fn discover(&mut self, mesh_name: &str) -> DiscoveryResult {
        if !self.interactive.contains(mesh_name) {
            return DiscoveryResult::NotInteractive;
        }
        if self.discovered.insert(mesh_name.to_owned()) {
            DiscoveryResult::New
        } else {
            DiscoveryResult::Repeat
        }
    }

    #[must_use]
    pub fn is_discovered(&self, mesh_name: &str) -> bool {
        self.discovered.contains(mesh_name)
    }

    /// True once every interactive hotspot is discovered; vacuously true for a
    /// scene without any.
    #[must_use]
    pub fn all_discovered(&self) -> bool {
        self.discovered.len() == self.interactive.len()
    }

    #[must_use]
    pub fn discovered_count(&self) -> usize {
        self.discovered.len()
    }

    #[must_use]
    pub fn total_interactive(&self) -> usize {
        self.interactive.len()
    }

    /// Discovered mesh names, sorted.
    pub fn discovered(&self) -> impl Iterator<Item = &str> {
        self.discovered.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use storyflow_catalog::domain::media::{HotspotConfig, HotspotContentType};

    use super::*;

    fn hotspot(mesh_name: &str, content_type: HotspotContentType) -> HotspotConfig {
        HotspotConfig {
            mesh_name: mesh_name.to_owned(),
            content_type,
            title: String::new(),
            url: String::new(),
            reward_id: None,
            character_id: None,
            subtitles_url: None,
            success_reward_id: None,
            failure_reward_id: None,
            app_config: None,
            position: None,
        }
    }

    fn scene() -> SceneConfig {
        SceneConfig {
            hotspots: vec![
                hotspot("a", HotspotContentType::Image),
                hotspot("b", HotspotContentType::Video),
                hotspot("music", HotspotContentType::BackgroundMusic),
            ],
            background_music_url: Some("theme.mp3".into()),
        }
    }

    #[test]
    fn test_all_discovered_after_each_interactive_mesh_once() {
        // Arrange
        let mut tracker = HotspotTracker::for_scene(&scene());
        assert_eq!(tracker.total_interactive(), 2);

        // Act / Assert
        assert_eq!(tracker.discover("a"), DiscoveryResult::New);
        assert!(!tracker.all_discovered());
        assert_eq!(tracker.discover("a"), DiscoveryResult::Repeat);
        assert!(!tracker.all_discovered());
        assert_eq!(tracker.discover("b"), DiscoveryResult::New);
        assert!(tracker.all_discovered());
    }

    #[test]
    fn test_background_music_is_not_discoverable() {
        let mut tracker = HotspotTracker::for_scene(&scene());
        assert_eq!(tracker.discover("music"), DiscoveryResult::NotInteractive);
        assert_eq!(tracker.discover("missing"), DiscoveryResult::NotInteractive);
        assert_eq!(tracker.discovered_count(), 0);
    }

    #[test]
    fn test_scene_without_hotspots_is_vacuously_complete() {
        let tracker = HotspotTracker::for_scene(&SceneConfig::default());
        assert!(tracker.all_discovered());
    }
}
