//! Domain events for the Reward Ledger context.

use serde::{Deserialize, Serialize};
use storyflow_core::event::{DomainEvent, EventMetadata};
use storyflow_core::ids::{CharacterId, RewardId, StoryId};

use super::achievements::Achievement;

/// Event type name for [`XpApplied`].
pub const XP_APPLIED_EVENT_TYPE: &str = "ledger.xp_applied";
/// Event type name for [`RewardGranted`].
pub const REWARD_GRANTED_EVENT_TYPE: &str = "ledger.reward_granted";
/// Event type name for [`StoryVisited`].
pub const STORY_VISITED_EVENT_TYPE: &str = "ledger.story_visited";
/// Event type name for [`StoryCompleted`].
pub const STORY_COMPLETED_EVENT_TYPE: &str = "ledger.story_completed";
/// Event type name for [`CharacterKnown`].
pub const CHARACTER_KNOWN_EVENT_TYPE: &str = "ledger.character_known";
/// Event type name for [`LocationVisited`].
pub const LOCATION_VISITED_EVENT_TYPE: &str = "ledger.location_visited";
/// Event type name for [`AchievementUnlocked`].
pub const ACHIEVEMENT_UNLOCKED_EVENT_TYPE: &str = "ledger.achievement_unlocked";

/// Emitted when the XP total changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpApplied {
    /// Signed change; negative is a cost.
    pub delta: i64,
    /// Why the XP changed.
    pub reason: String,
    /// Total after the change.
    pub xp_total: i64,
    /// Level after the change.
    pub level: i64,
}

/// Emitted when an inventory row is added or its quantity grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardGranted {
    /// The granted reward.
    pub reward_id: RewardId,
    /// Quantity held after the grant.
    pub quantity: u32,
    /// Story the grant happened in.
    pub story_id: Option<StoryId>,
}

/// Emitted when a story joins the visited set outside of completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryVisited {
    /// The visited story.
    pub story_id: StoryId,
}

/// Emitted the first time a story is completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryCompleted {
    /// The completed story.
    pub story_id: StoryId,
    /// Completion bonus applied.
    pub bonus_xp: i64,
}

/// Emitted when a character is met for the first time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterKnown {
    /// The character.
    pub character_id: CharacterId,
    /// The recorded name.
    pub name: String,
}

/// Emitted the first time a location is visited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationVisited {
    /// The visited location.
    pub location_id: String,
    /// XP applied for the visit.
    pub xp: i64,
}

/// Emitted when an achievement unlocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementUnlocked {
    /// The unlocked achievement.
    pub achievement: Achievement,
}

/// Event payload variants for the Reward Ledger context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEventKind {
    /// XP has been applied.
    XpApplied(XpApplied),
    /// A reward has been granted.
    RewardGranted(RewardGranted),
    /// A story has been visited.
    StoryVisited(StoryVisited),
    /// A story has been completed.
    StoryCompleted(StoryCompleted),
    /// A character has been met.
    CharacterKnown(CharacterKnown),
    /// A location has been visited.
    LocationVisited(LocationVisited),
    /// An achievement has been unlocked.
    AchievementUnlocked(AchievementUnlocked),
}

impl LedgerEventKind {
    /// The routing name of this variant.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::XpApplied(_) => XP_APPLIED_EVENT_TYPE,
            Self::RewardGranted(_) => REWARD_GRANTED_EVENT_TYPE,
            Self::StoryVisited(_) => STORY_VISITED_EVENT_TYPE,
            Self::StoryCompleted(_) => STORY_COMPLETED_EVENT_TYPE,
            Self::CharacterKnown(_) => CHARACTER_KNOWN_EVENT_TYPE,
            Self::LocationVisited(_) => LOCATION_VISITED_EVENT_TYPE,
            Self::AchievementUnlocked(_) => ACHIEVEMENT_UNLOCKED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Reward Ledger context.
#[derive(Debug, Clone)]
pub struct LedgerEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: LedgerEventKind,
}

impl DomainEvent for LedgerEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(&self.kind).unwrap_or_default()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use storyflow_core::ids::PlayerId;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_event_type_and_payload_follow_kind() {
        // Arrange
        let event = LedgerEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: REWARD_GRANTED_EVENT_TYPE.to_owned(),
                player_id: PlayerId(Uuid::new_v4()),
                correlation_id: Uuid::new_v4(),
                occurred_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
            },
            kind: LedgerEventKind::RewardGranted(RewardGranted {
                reward_id: RewardId(7),
                quantity: 2,
                story_id: Some(StoryId(1)),
            }),
        };

        // Act
        let payload = event.to_payload();

        // Assert
        assert_eq!(event.event_type(), "ledger.reward_granted");
        assert_eq!(payload["RewardGranted"]["quantity"], 2);
        assert_eq!(payload["RewardGranted"]["reward_id"], 7);
    }
}
