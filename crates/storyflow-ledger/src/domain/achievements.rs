//! Progression achievements.

use serde::{Deserialize, Serialize};

use super::stats::PlayerStats;

/// A milestone unlocked by player progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    /// Completed a first story.
    FirstStory,
    /// Completed five stories.
    NoviceExplorer,
    /// Completed ten stories.
    ExpertNarrator,
    /// Reached level 5.
    Veteran,
    /// Met five characters.
    Socialite,
    /// Visited ten locations.
    UrbanExplorer,
}

impl Achievement {
    /// Every achievement, in evaluation order.
    pub const ALL: [Self; 6] = [
        Self::FirstStory,
        Self::NoviceExplorer,
        Self::ExpertNarrator,
        Self::Veteran,
        Self::Socialite,
        Self::UrbanExplorer,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstStory => "first_story",
            Self::NoviceExplorer => "novice_explorer",
            Self::ExpertNarrator => "expert_narrator",
            Self::Veteran => "veteran",
            Self::Socialite => "socialite",
            Self::UrbanExplorer => "urban_explorer",
        }
    }

    /// Looks an achievement up by its stored name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }

    /// Whether `stats` meets this achievement's threshold.
    #[must_use]
    pub fn is_earned(self, stats: &PlayerStats) -> bool {
        match self {
            Self::FirstStory => stats.stories_completed >= 1,
            Self::NoviceExplorer => stats.stories_completed >= 5,
            Self::ExpertNarrator => stats.stories_completed >= 10,
            Self::Veteran => stats.level >= 5,
            Self::Socialite => stats.known_characters.len() >= 5,
            Self::UrbanExplorer => stats.visited_locations.len() >= 10,
        }
    }
}
