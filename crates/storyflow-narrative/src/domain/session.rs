//! The owned state of one play session.

use std::sync::Arc;

use serde::Serialize;
use storyflow_catalog::application::cache::{CatalogCache, StepSequence};
use storyflow_catalog::domain::media::{MediaResource, SceneConfig};
use storyflow_catalog::domain::step::FlowStep;
use storyflow_core::ids::{PlayerId, SessionId, StepId, StoryId};
use storyflow_ledger::domain::stats::PlayerStats;
use tracing::warn;

use super::bridge::BridgeState;
use super::gate::{GateRequirement, GateStatus, MediaGate};
use super::tracker::HotspotTracker;

/// Where the session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No story selected.
    Hub,
    /// Playing the active step.
    InStory,
    /// A branch ended without reaching a `final` step, or pointed at a
    /// missing step.
    EndOfSequence,
    /// A `final` step completed the story and nothing follows.
    StoryComplete,
}

#[derive(Debug, Clone)]
struct ActiveStory {
    sequence: StepSequence,
    index: usize,
}

/// Everything that changes while a player moves through stories.
#[derive(Debug, Clone)]
pub struct FlowSession {
    id: SessionId,
    player_id: PlayerId,
    locale: String,
    catalog: Arc<CatalogCache>,
    pub(crate) stats: PlayerStats,
    phase: SessionPhase,
    active: Option<ActiveStory>,
    visited_this_session: Vec<StoryId>,
    pub(crate) tracker: HotspotTracker,
    pub(crate) gate: MediaGate,
    pub(crate) bridge: BridgeState,
}

impl FlowSession {
    #[must_use]
    pub fn new(
        id: SessionId,
        player_id: PlayerId,
        locale: impl Into<String>,
        catalog: Arc<CatalogCache>,
        stats: PlayerStats,
    ) -> Self {
        Self {
            id,
            player_id,
            locale: locale.into(),
            catalog,
            stats,
            phase: SessionPhase::Hub,
            active: None,
            visited_this_session: Vec::new(),
            tracker: HotspotTracker::default(),
            gate: MediaGate::new(GateRequirement::Immediate),
            bridge: BridgeState::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    #[must_use]
    pub fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Stories entered during this session, in order.
    #[must_use]
    pub fn visited_this_session(&self) -> &[StoryId] {
        &self.visited_this_session
    }

    #[must_use]
    pub fn tracker(&self) -> &HotspotTracker {
        &self.tracker
    }

    #[must_use]
    pub fn gate(&self) -> &MediaGate {
        &self.gate
    }

    #[must_use]
    pub fn bridge(&self) -> &BridgeState {
        &self.bridge
    }

    #[must_use]
    pub fn gate_status(&self) -> GateStatus {
        self.gate.status(&self.tracker)
    }

    #[must_use]
    pub fn active_story_id(&self) -> Option<StoryId> {
        self.active.as_ref().map(|active| active.sequence.story_id())
    }

    /// The active step; `None` in the hub.
    #[must_use]
    pub fn current_step(&self) -> Option<&FlowStep> {
        let active = self.active.as_ref()?;
        active.sequence.get(active.index)
    }

    /// The active step while the story is still being played.
    #[must_use]
    pub fn playable_step(&self) -> Option<&FlowStep> {
        if self.phase == SessionPhase::InStory {
            self.current_step()
        } else {
            None
        }
    }

    /// Media of the active step. Missing or rejected resources count as no
    /// media.
    #[must_use]
    pub fn current_media(&self) -> Option<&MediaResource> {
        let step = self.current_step()?;
        let media_id = step.media_resource_id?;
        self.catalog.media(media_id)
    }

    #[must_use]
    pub fn current_scene(&self) -> Option<&SceneConfig> {
        self.current_media().and_then(MediaResource::scene)
    }

    /// Position of `step_id` in the active story.
    #[must_use]
    pub fn position_of(&self, step_id: StepId) -> Option<usize> {
        self.active.as_ref()?.sequence.position_of(step_id)
    }

    pub(crate) fn replace_stats(&mut self, stats: PlayerStats) {
        self.stats = stats;
    }

    /// Starts `sequence` at its entry step with fresh per-step state.
    pub(crate) fn enter_story(&mut self, sequence: StepSequence) {
        let story_id = sequence.story_id();
        self.active = Some(ActiveStory { sequence, index: 0 });
        if !self.visited_this_session.contains(&story_id) {
            self.visited_this_session.push(story_id);
        }
        self.phase = SessionPhase::InStory;
        self.bridge.close();
        self.arm_step();
    }

    /// Moves to `index` of the active story. Re-entering the active step keeps
    /// its gate, overlay and discovery state.
    pub(crate) fn enter_index(&mut self, index: usize) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let same_step = active.index == index && self.phase == SessionPhase::InStory;
        active.index = index;
        self.phase = SessionPhase::InStory;
        if !same_step {
            self.bridge.close();
            self.arm_step();
        }
    }

    pub(crate) fn finish(&mut self, phase: SessionPhase) {
        self.phase = phase;
        self.bridge.close();
    }

    pub(crate) fn leave_story(&mut self) {
        self.active = None;
        self.phase = SessionPhase::Hub;
        self.bridge.close();
        self.tracker = HotspotTracker::default();
        self.gate = MediaGate::new(GateRequirement::Immediate);
    }

    fn arm_step(&mut self) {
        let (requirement, tracker) = match self.current_step() {
            Some(step) => {
                if let Some(media_id) = step.media_resource_id
                    && self.catalog.media(media_id).is_none()
                {
                    warn!(step_id = %step.id, media_id = %media_id, "step media unavailable");
                }
                let media = self.current_media();
                let tracker = media
                    .and_then(MediaResource::scene)
                    .map(HotspotTracker::for_scene)
                    .unwrap_or_default();
                (GateRequirement::for_step(step, media), tracker)
            }
            None => (GateRequirement::Immediate, HotspotTracker::default()),
        };
        self.gate = MediaGate::new(requirement);
        self.tracker = tracker;
    }
}
