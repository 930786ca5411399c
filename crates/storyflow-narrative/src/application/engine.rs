//! The flow engine: the step state machine.
//!
//! Each public operation takes the session it acts on and runs to completion,
//! awaiting every ledger write before it returns. Ledger failures are logged
//! and the transition proceeds with the last known stats; catalog failures
//! abort the operation and leave the session as it was.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use storyflow_catalog::application::cache::{CatalogCache, StepSequence};
use storyflow_catalog::application::source::CatalogSource;
use storyflow_catalog::domain::media::HotspotContentType;
use storyflow_catalog::domain::step::{DecisionOption, FlowStep, StepType};
use storyflow_core::clock::Clock;
use storyflow_core::command::Command;
use storyflow_core::error::DomainError;
use storyflow_core::ids::{CharacterId, PlayerId, RewardId, SessionId, StepId, StoryId};
use storyflow_ledger::application::ledger::{GrantOptions, RewardLedger};
use storyflow_ledger::domain::stats::PlayerStats;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::commands::{
    AdvanceStep, DiscoverHotspot, DismissOverlay, ReportMediaEnded, ReturnToHub, SelectStory,
};
use crate::domain::gate::{GateRequirement, GateStatus};
use crate::domain::locks::{self, StoryLock};
use crate::domain::session::{FlowSession, SessionPhase};
use crate::domain::tracker::DiscoveryResult;

/// What to do when a child app never reports a result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppIdlePolicy {
    /// Wait indefinitely; the player can still return to the hub.
    #[default]
    None,
    /// Treat the attempt as a `failure` once this much time has passed since
    /// launch.
    FailAfter(Duration),
}

/// Engine tunables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub app_idle: AppIdlePolicy,
}

/// Why an operation left the session where it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StayReason {
    /// No story is being played.
    NoActiveStep,
    /// The media gate is still closed.
    GateClosed,
    /// App steps only move on a child-app result.
    AwaitingAppResult,
    /// No option matches the choice or reported status.
    NoMatchingOption,
    /// The event belongs to a step that is no longer active.
    StaleEvent,
    /// The active step has no video or audio.
    NotTimedMedia,
}

/// The outcome of a flow operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Transition {
    /// A step became active.
    EnteredStep { story_id: StoryId, step_id: StepId },
    /// The active step's gate opened without moving on.
    GateOpened { step_id: StepId },
    /// Nothing moved.
    Stayed { reason: StayReason },
    /// The requested story needs another story first.
    Locked { lock: StoryLock },
    /// The branch ended without a `final` step.
    EndOfSequence { story_id: StoryId },
    /// The story was completed and nothing follows it.
    StoryComplete { story_id: StoryId },
    /// The session is back in the hub.
    ReturnedToHub,
}

pub(crate) fn stayed(reason: StayReason) -> Transition {
    Transition::Stayed { reason }
}

/// Result of a hotspot discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discovery {
    pub mesh_name: String,
    /// `true` only on the first discovery of this mesh.
    pub newly_discovered: bool,
    pub discovered: usize,
    pub total: usize,
    pub all_discovered: bool,
    pub gate: GateStatus,
    /// Whether a child app was launched for this hotspot.
    pub launched_app: bool,
}

/// Applies commands to flow sessions.
#[derive(Clone)]
pub struct FlowEngine {
    source: Arc<dyn CatalogSource>,
    pub(crate) ledger: RewardLedger,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: EngineConfig,
}

impl std::fmt::Debug for FlowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowEngine")
            .field("ledger", &self.ledger)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FlowEngine {
    #[must_use]
    pub fn new(
        source: Arc<dyn CatalogSource>,
        ledger: RewardLedger,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        Self {
            source,
            ledger,
            clock,
            config,
        }
    }

    #[must_use]
    pub fn ledger(&self) -> &RewardLedger {
        &self.ledger
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Loads the catalog and the player's stats into a new session in the hub.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CatalogLoad` if the catalog cannot be fetched, or
    /// the store's error if the player's stats cannot be read.
    #[instrument(skip(self), fields(player_id = %player_id))]
    pub async fn open_session(
        &self,
        player_id: PlayerId,
        locale: &str,
    ) -> Result<FlowSession, DomainError> {
        let catalog = CatalogCache::load(self.source.as_ref()).await?;
        let stats = self.ledger.stats(player_id).await?;
        let session = FlowSession::new(
            SessionId::new_v7(),
            player_id,
            locale,
            Arc::new(catalog),
            stats,
        );
        info!(session_id = %session.id(), "session opened");
        Ok(session)
    }

    /// Enters a story at its entry step, unless it is locked.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for a story missing from the catalog,
    /// or `DomainError::CatalogLoad` if its steps cannot be loaded. The
    /// session is unchanged on error.
    #[instrument(skip_all, fields(session_id = %command.session_id, story_id = %command.story_id))]
    pub async fn select_story(
        &self,
        session: &mut FlowSession,
        command: &SelectStory,
    ) -> Result<Transition, DomainError> {
        debug!(command_type = command.command_type(), "handling command");
        self.enter_story(session, command.story_id, command.correlation_id())
            .await
    }

    /// Leaves the active step, as a decision click or "continue".
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CatalogLoad` if a `final` step chains into a
    /// story whose steps cannot be loaded.
    #[instrument(skip_all, fields(session_id = %command.session_id))]
    pub async fn advance(
        &self,
        session: &mut FlowSession,
        command: &AdvanceStep,
    ) -> Result<Transition, DomainError> {
        debug!(command_type = command.command_type(), target_step_id = ?command.target_step_id, "handling command");
        self.advance_from(session, command.target_step_id, command.correlation_id())
            .await
    }

    /// Records end of playback on the active step. Narrative steps then
    /// continue on their own; decision steps open their options.
    ///
    /// # Errors
    ///
    /// Same as [`advance`](Self::advance).
    #[instrument(skip_all, fields(session_id = %command.session_id, step_id = %command.step_id))]
    pub async fn media_ended(
        &self,
        session: &mut FlowSession,
        command: &ReportMediaEnded,
    ) -> Result<Transition, DomainError> {
        let Some(step) = session.playable_step().cloned() else {
            return Ok(stayed(StayReason::NoActiveStep));
        };
        if step.id != command.step_id {
            debug!(active_step_id = %step.id, "media ended for an inactive step");
            return Ok(stayed(StayReason::StaleEvent));
        }
        if session.gate.requirement() != GateRequirement::Playback {
            return Ok(stayed(StayReason::NotTimedMedia));
        }
        if !session.gate.media_ended() {
            return Ok(stayed(StayReason::StaleEvent));
        }
        if step.step_type == StepType::Narrative {
            return self
                .advance_from(session, None, command.correlation_id())
                .await;
        }
        Ok(Transition::GateOpened { step_id: step.id })
    }

    /// Dismisses the instructional overlay of a 3D step.
    #[instrument(skip_all, fields(session_id = %command.session_id))]
    pub fn dismiss_overlay(&self, session: &mut FlowSession, command: &DismissOverlay) -> GateStatus {
        debug!(command_type = command.command_type(), "handling command");
        if session.playable_step().is_some() {
            session.gate.dismiss_overlay();
        }
        session.gate_status()
    }

    /// Discovers a hotspot of the active 3D scene. Its reward and character
    /// are granted on first discovery only; `interactive` hotspots launch
    /// their child app on every call and leave rewards to the app result.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when no story is being played, or
    /// `DomainError::NotFound` if the active scene has no such hotspot.
    #[instrument(skip_all, fields(session_id = %command.session_id, mesh_name = %command.mesh_name))]
    pub async fn discover_hotspot(
        &self,
        session: &mut FlowSession,
        command: &DiscoverHotspot,
    ) -> Result<Discovery, DomainError> {
        let Some(step) = session.playable_step().cloned() else {
            return Err(DomainError::Validation("no step is active".into()));
        };
        let hotspot = session
            .current_scene()
            .and_then(|scene| scene.hotspot(&command.mesh_name))
            .cloned()
            .ok_or_else(|| DomainError::not_found("hotspot", &command.mesh_name))?;

        let result = session.tracker.discover(&command.mesh_name);
        let is_app = hotspot.content_type == HotspotContentType::Interactive;
        if result == DiscoveryResult::New {
            info!("hotspot discovered");
            if !is_app && let Some(reward_id) = hotspot.reward_id {
                self.grant(session, reward_id, command.correlation_id()).await;
            }
            if let Some(character_id) = hotspot.character_id {
                self.meet(session, character_id, command.correlation_id()).await;
            }
        }
        if is_app {
            self.launch_hotspot_app(session, &step, &hotspot);
        }

        Ok(Discovery {
            mesh_name: command.mesh_name.clone(),
            newly_discovered: result == DiscoveryResult::New,
            discovered: session.tracker.discovered_count(),
            total: session.tracker.total_interactive(),
            all_discovered: session.tracker.all_discovered(),
            gate: session.gate_status(),
            launched_app: is_app,
        })
    }

    /// Leaves the active story.
    #[instrument(skip_all, fields(session_id = %command.session_id))]
    pub fn return_to_hub(&self, session: &mut FlowSession, command: &ReturnToHub) -> Transition {
        debug!(command_type = command.command_type(), "handling command");
        session.leave_story();
        Transition::ReturnedToHub
    }

    pub(crate) async fn enter_story(
        &self,
        session: &mut FlowSession,
        story_id: StoryId,
        correlation_id: Uuid,
    ) -> Result<Transition, DomainError> {
        let story = session
            .catalog()
            .story(story_id)
            .ok_or_else(|| DomainError::not_found("story", story_id))?;
        if let Some(lock) = locks::lock_for(story, session.catalog(), &session.stats.visited_stories)
        {
            info!(required_story_id = %lock.required_story_id, "story is locked");
            return Ok(Transition::Locked { lock });
        }

        let sequence = StepSequence::load(self.source.as_ref(), story_id).await?;
        session.enter_story(sequence);
        debug!(%correlation_id, "story entered");
        Ok(self.on_step_entered(session))
    }

    pub(crate) async fn advance_from(
        &self,
        session: &mut FlowSession,
        target: Option<StepId>,
        correlation_id: Uuid,
    ) -> Result<Transition, DomainError> {
        let Some(step) = session.playable_step().cloned() else {
            return Ok(stayed(StayReason::NoActiveStep));
        };
        match session.gate_status() {
            GateStatus::Open => {}
            GateStatus::AwaitingAppResult => return Ok(stayed(StayReason::AwaitingAppResult)),
            status => {
                debug!(step_id = %step.id, ?status, "gate closed");
                return Ok(stayed(StayReason::GateClosed));
            }
        }

        match step.step_type {
            StepType::Narrative => {
                self.continue_narrative(session, &step, correlation_id).await;
                Ok(self.go_to(session, target.or_else(|| step.next_step())))
            }
            StepType::Decision => {
                let Some(option) = target.and_then(|t| step.option_for_target(t)).cloned() else {
                    warn!(step_id = %step.id, target_step_id = ?target, "no decision option leads there");
                    return Ok(stayed(StayReason::NoMatchingOption));
                };
                Ok(self.take_option(session, &option, correlation_id).await)
            }
            StepType::Final => self.finish_story(session, &step, correlation_id).await,
            StepType::App => Ok(stayed(StayReason::AwaitingAppResult)),
        }
    }

    /// Grants the option's reward, if any, then moves to its target.
    pub(crate) async fn take_option(
        &self,
        session: &mut FlowSession,
        option: &DecisionOption,
        correlation_id: Uuid,
    ) -> Transition {
        if let Some(reward_id) = option.reward_id {
            self.grant(session, reward_id, correlation_id).await;
        }
        self.go_to(session, Some(option.next_step_id))
    }

    async fn continue_narrative(&self, session: &mut FlowSession, step: &FlowStep, correlation_id: Uuid) {
        let (Some(character_id), Some(reward_id)) = (step.character_id, step.reward_id) else {
            return;
        };
        if session.stats.has_visited(step.story_id) {
            return;
        }
        let already_known = session
            .catalog()
            .character(character_id)
            .is_some_and(|c| session.stats.known_characters.contains(&c.name));
        if already_known {
            return;
        }
        self.meet(session, character_id, correlation_id).await;
        self.grant(session, reward_id, correlation_id).await;
    }

    async fn finish_story(
        &self,
        session: &mut FlowSession,
        step: &FlowStep,
        correlation_id: Uuid,
    ) -> Result<Transition, DomainError> {
        let story_id = step.story_id;
        match self
            .ledger
            .complete_story(session.player_id(), story_id, correlation_id)
            .await
        {
            Ok(completion) => {
                info!(story_id = %story_id, first = completion.first_completion, "story completed");
                session.replace_stats(completion.stats);
            }
            Err(err) => warn!(story_id = %story_id, error = %err, "failed to record story completion"),
        }
        session.finish(SessionPhase::StoryComplete);

        let Some(next_story) = step.next_story() else {
            return Ok(Transition::StoryComplete { story_id });
        };
        if session.catalog().story(next_story).is_none() {
            warn!(story_id = %story_id, next_story_id = %next_story, "final step points at an unknown story");
            return Ok(Transition::StoryComplete { story_id });
        }
        self.enter_story(session, next_story, correlation_id).await
    }

    /// Activates `target` in the active story, or ends the branch.
    fn go_to(&self, session: &mut FlowSession, target: Option<StepId>) -> Transition {
        let story_id = session.active_story_id().unwrap_or(StoryId(0));
        let Some(target) = target else {
            info!(story_id = %story_id, "branch ended without a final step");
            session.finish(SessionPhase::EndOfSequence);
            return Transition::EndOfSequence { story_id };
        };
        match session.position_of(target) {
            Some(index) => {
                session.enter_index(index);
                self.on_step_entered(session)
            }
            None => {
                warn!(story_id = %story_id, step_id = %target, "next step not found");
                session.finish(SessionPhase::EndOfSequence);
                Transition::EndOfSequence { story_id }
            }
        }
    }

    fn on_step_entered(&self, session: &mut FlowSession) -> Transition {
        let Some(step) = session.current_step().cloned() else {
            return stayed(StayReason::NoActiveStep);
        };
        if step.step_type == StepType::App {
            self.launch_app_step(session, &step);
        }
        debug!(step_id = %step.id, step_type = step.step_type.as_str(), "step entered");
        Transition::EnteredStep {
            story_id: step.story_id,
            step_id: step.id,
        }
    }

    /// Grants a catalog reward with its XP in the active story.
    pub(crate) async fn grant(&self, session: &mut FlowSession, reward_id: RewardId, correlation_id: Uuid) {
        let options = GrantOptions {
            story_id: session.active_story_id(),
            mark_story_visited: false,
            apply_reward_xp: true,
        };
        let result = self
            .ledger
            .grant_reward(session.player_id(), session.catalog(), reward_id, options, correlation_id)
            .await;
        absorb(session, result, "grant reward");
    }

    async fn meet(&self, session: &mut FlowSession, character_id: CharacterId, correlation_id: Uuid) {
        let result = self
            .ledger
            .mark_character_known(session.player_id(), session.catalog(), character_id, correlation_id)
            .await;
        absorb(session, result, "mark character known");
    }
}

/// Keeps the persisted stats on success; logs and keeps the old ones on
/// failure.
pub(crate) fn absorb(session: &mut FlowSession, result: Result<PlayerStats, DomainError>, what: &str) {
    match result {
        Ok(stats) => session.replace_stats(stats),
        Err(err) => warn!(player_id = %session.player_id(), error = %err, "failed to {what}"),
    }
}
