//! The media gate: whether the active step may be continued.

use serde::Serialize;
use storyflow_catalog::domain::media::{MediaKind, MediaResource};
use storyflow_catalog::domain::step::{FlowStep, StepType};

use super::tracker::HotspotTracker;

/// What the active step waits for before it may be continued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateRequirement {
    /// Static or absent media; open immediately.
    Immediate,
    /// Video or audio; open when playback ends.
    Playback,
    /// 3D scene; open when the overlay is dismissed and every hotspot found.
    Exploration,
    /// App step; only a child-app result moves the step on.
    AppResult,
}

impl GateRequirement {
    /// The requirement for `step` showing `media`.
    #[must_use]
    pub fn for_step(step: &FlowStep, media: Option<&MediaResource>) -> Self {
        if step.step_type == StepType::App {
            return Self::AppResult;
        }
        match media.map(|m| m.kind) {
            Some(kind) if kind.is_timed() => Self::Playback,
            Some(MediaKind::Model3d) => Self::Exploration,
            _ => Self::Immediate,
        }
    }
}

/// Observable gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    Open,
    AwaitingPlayback,
    AwaitingOverlayDismissal,
    AwaitingDiscovery,
    AwaitingAppResult,
}

/// Gate state of the active step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaGate {
    requirement: GateRequirement,
    playback_ended: bool,
    overlay_dismissed: bool,
}

impl MediaGate {
    #[must_use]
    pub fn new(requirement: GateRequirement) -> Self {
        Self {
            requirement,
            playback_ended: false,
            overlay_dismissed: false,
        }
    }

    #[must_use]
    pub fn requirement(&self) -> GateRequirement {
        self.requirement
    }

    /// Records end of playback. Returns `false` if the step has no timed
    /// media or playback had already ended.
    pub fn media_ended(&mut self) -> bool {
        if self.requirement != GateRequirement::Playback || self.playback_ended {
            return false;
        }
        self.playback_ended = true;
        true
    }

    pub fn dismiss_overlay(&mut self) {
        self.overlay_dismissed = true;
    }

    /// The instructional overlay shows once per step entry on 3D steps.
    #[must_use]
    pub fn overlay_visible(&self) -> bool {
        self.requirement == GateRequirement::Exploration && !self.overlay_dismissed
    }

    #[must_use]
    pub fn status(&self, tracker: &HotspotTracker) -> GateStatus {
        match self.requirement {
            GateRequirement::Immediate => GateStatus::Open,
            GateRequirement::Playback if self.playback_ended => GateStatus::Open,
            GateRequirement::Playback => GateStatus::AwaitingPlayback,
            GateRequirement::Exploration if !self.overlay_dismissed => {
                GateStatus::AwaitingOverlayDismissal
            }
            GateRequirement::Exploration if !tracker.all_discovered() => {
                GateStatus::AwaitingDiscovery
            }
            GateRequirement::Exploration => GateStatus::Open,
            GateRequirement::AppResult => GateStatus::AwaitingAppResult,
        }
    }

    #[must_use]
    pub fn is_open(&self, tracker: &HotspotTracker) -> bool {
        self.status(tracker) == GateStatus::Open
    }
}
