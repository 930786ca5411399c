//! Flow steps and their outgoing edges.

use serde::{Deserialize, Serialize};
use storyflow_core::ids::{CharacterId, MediaId, RewardId, StepId, StoryId};

/// The behavior class of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    /// Shows content and continues to a single next step.
    Narrative,
    /// Offers a set of options, each leading to a step.
    Decision,
    /// Ends the story, optionally chaining into another story.
    Final,
    /// Hosts an embedded child application whose result picks the next step.
    App,
}

impl StepType {
    /// Returns the canonical wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Narrative => "narrative",
            Self::Decision => "decision",
            Self::Final => "final",
            Self::App => "app",
        }
    }
}

/// Where a step leads. Resolved once, when content is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NextTarget {
    /// Another step of the same story.
    Step(StepId),
    /// The entry step of another story.
    Story(StoryId),
}

/// One outgoing edge of a decision (or app outcome) step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionOption {
    /// Label shown to the player; for child apps, the status string it matches.
    pub text: String,
    /// Step the option leads to.
    pub next_step_id: StepId,
    /// Reward granted when the option is taken.
    pub reward_id: Option<RewardId>,
}

/// Finds the option whose text equals `status` exactly.
#[must_use]
pub fn option_for_status<'a>(
    options: &'a [DecisionOption],
    status: &str,
) -> Option<&'a DecisionOption> {
    options.iter().find(|option| option.text == status)
}

/// An atomic narrative unit within a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowStep {
    /// Step identifier.
    pub id: StepId,
    /// Owning story.
    pub story_id: StoryId,
    /// Position within the story; `0` marks the entry step.
    pub order_index: i32,
    /// Behavior class.
    pub step_type: StepType,
    /// Narrative text.
    pub content: Option<String>,
    /// Reward attached to the step.
    pub reward_id: Option<RewardId>,
    /// Character introduced by the step.
    pub character_id: Option<CharacterId>,
    /// Media shown by the step.
    pub media_resource_id: Option<MediaId>,
    /// Resolved successor.
    pub next: Option<NextTarget>,
    /// Decision options, in authored order.
    pub options: Vec<DecisionOption>,
}

impl FlowStep {
    /// The next step within the story, if the successor is a step.
    #[must_use]
    pub fn next_step(&self) -> Option<StepId> {
        match self.next {
            Some(NextTarget::Step(id)) => Some(id),
            _ => None,
        }
    }

    /// The story this step chains into, if the successor is a story.
    #[must_use]
    pub fn next_story(&self) -> Option<StoryId> {
        match self.next {
            Some(NextTarget::Story(id)) => Some(id),
            _ => None,
        }
    }

    /// Finds the decision option leading to `target`.
    #[must_use]
    pub fn option_for_target(&self, target: StepId) -> Option<&DecisionOption> {
        self.options
            .iter()
            .find(|option| option.next_step_id == target)
    }

    /// Whether the step introduces a character as its reward.
    #[must_use]
    pub fn has_character_reward(&self) -> bool {
        self.character_id.is_some() && self.reward_id.is_some()
    }
}
