//! Commands for the Narrative Flow context.

use serde_json::Value;
use storyflow_core::command::Command;
use storyflow_core::ids::{SessionId, StepId, StoryId};
use uuid::Uuid;

/// Command to enter a story at its entry step.
#[derive(Debug, Clone)]
pub struct SelectStory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to act on.
    pub session_id: SessionId,
    /// The story to enter.
    pub story_id: StoryId,
}

impl Command for SelectStory {
    fn command_type(&self) -> &'static str {
        "narrative.select_story"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to leave the active step, by decision or "continue".
#[derive(Debug, Clone)]
pub struct AdvanceStep {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to act on.
    pub session_id: SessionId,
    /// The chosen option's target on decision steps. On narrative steps it
    /// replaces the authored successor when given.
    pub target_step_id: Option<StepId>,
}

impl Command for AdvanceStep {
    fn command_type(&self) -> &'static str {
        "narrative.advance_step"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command reporting that a step's video or audio finished playing.
#[derive(Debug, Clone)]
pub struct ReportMediaEnded {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to act on.
    pub session_id: SessionId,
    /// The step whose media ended.
    pub step_id: StepId,
}

impl Command for ReportMediaEnded {
    fn command_type(&self) -> &'static str {
        "narrative.report_media_ended"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to discover (click) a hotspot of the active 3D scene.
#[derive(Debug, Clone)]
pub struct DiscoverHotspot {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to act on.
    pub session_id: SessionId,
    /// The clicked mesh.
    pub mesh_name: String,
}

impl Command for DiscoverHotspot {
    fn command_type(&self) -> &'static str {
        "narrative.discover_hotspot"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to dismiss the instructional overlay of a 3D step.
#[derive(Debug, Clone)]
pub struct DismissOverlay {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to act on.
    pub session_id: SessionId,
}

impl Command for DismissOverlay {
    fn command_type(&self) -> &'static str {
        "narrative.dismiss_overlay"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command delivering a raw message posted by a child app.
#[derive(Debug, Clone)]
pub struct DeliverChildMessage {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to act on.
    pub session_id: SessionId,
    /// The message as posted.
    pub payload: Value,
}

impl Command for DeliverChildMessage {
    fn command_type(&self) -> &'static str {
        "narrative.deliver_child_message"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to leave the active story for the hub.
#[derive(Debug, Clone)]
pub struct ReturnToHub {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to act on.
    pub session_id: SessionId,
}

impl Command for ReturnToHub {
    fn command_type(&self) -> &'static str {
        "narrative.return_to_hub"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
