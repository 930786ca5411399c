//! The child-app bridge: launching embedded apps and applying their results.
//!
//! A launch opens a presentation on the session. The launch payload is only
//! released once the child signals ready. A result is applied at most once
//! per identity: it is recorded before any ledger call, so a re-post never
//! touches the ledger twice.

use chrono::TimeDelta;
use serde::Serialize;
use storyflow_catalog::domain::media::HotspotConfig;
use storyflow_catalog::domain::step::{DecisionOption, FlowStep, option_for_status};
use storyflow_core::command::Command;
use storyflow_core::error::DomainError;
use storyflow_core::ids::RewardId;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::engine::{AppIdlePolicy, FlowEngine, StayReason, Transition, absorb, stayed};
use crate::domain::bridge::{LaunchConfig, LaunchOrigin};
use crate::domain::commands::DeliverChildMessage;
use crate::domain::protocol::{
    AppResult, ChildMessage, HOST_SOURCE, HostMessage, MessageIdentity, PlayerSnapshot,
};
use crate::domain::session::FlowSession;

/// `app_name` of results synthesized by the idle watchdog.
pub const IDLE_WATCHDOG_APP: &str = "idle-watchdog";

/// Why a child message changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// No presentation is open; the message arrived late.
    NoOpenPresentation,
    /// This result was already applied.
    Duplicate,
}

/// What handling a child message did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BridgeOutcome {
    Ignored { reason: IgnoreReason },
    /// The presentation was closed without a transition.
    Closed,
    /// The child is ready; `payload` is the message to post to it.
    Ready { payload: HostMessage },
    /// A result was applied.
    Applied { status: String, transition: Transition },
}

impl FlowEngine {
    /// Handles a raw message posted by the active child app.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a malformed message, or
    /// `DomainError::CatalogLoad` if the chosen outcome chains into a story
    /// whose steps cannot be loaded.
    #[instrument(skip_all, fields(session_id = %command.session_id))]
    pub async fn deliver_child_message(
        &self,
        session: &mut FlowSession,
        command: &DeliverChildMessage,
    ) -> Result<BridgeOutcome, DomainError> {
        debug!(command_type = command.command_type(), "handling command");
        match ChildMessage::parse(&command.payload)? {
            ChildMessage::Close { source } => {
                if session.bridge.close().is_some() {
                    info!(%source, "child app closed");
                    Ok(BridgeOutcome::Closed)
                } else {
                    Ok(BridgeOutcome::Ignored {
                        reason: IgnoreReason::NoOpenPresentation,
                    })
                }
            }
            ChildMessage::Ready { .. } => Ok(match self.child_ready(session) {
                Some(payload) => BridgeOutcome::Ready { payload },
                None => BridgeOutcome::Ignored {
                    reason: IgnoreReason::NoOpenPresentation,
                },
            }),
            ChildMessage::Result(result) => {
                self.apply_result(session, result, command.correlation_id())
                    .await
            }
        }
    }

    /// Marks the open presentation ready and builds its launch payload from
    /// the current stats. `None` if no child app is open.
    pub fn child_ready(&self, session: &mut FlowSession) -> Option<HostMessage> {
        let config = session.bridge.mark_ready()?.clone();
        Some(HostMessage {
            source: HOST_SOURCE.to_owned(),
            app_data: config.app_data,
            player_stats: PlayerSnapshot {
                inventory: session.stats.inventory.clone(),
                xp_total: session.stats.xp_total,
            },
            success_reward_id: config.success_reward_id,
            failure_reward_id: config.failure_reward_id,
            locale: session.locale().to_owned(),
        })
    }

    /// Fails an open presentation that outlived the idle timeout.
    ///
    /// # Errors
    ///
    /// Same as [`deliver_child_message`](Self::deliver_child_message).
    pub async fn poll_idle(
        &self,
        session: &mut FlowSession,
        correlation_id: Uuid,
    ) -> Result<Option<BridgeOutcome>, DomainError> {
        let AppIdlePolicy::FailAfter(timeout) = self.config.app_idle else {
            return Ok(None);
        };
        let Some(presentation) = session.bridge.presentation() else {
            return Ok(None);
        };
        let timeout = TimeDelta::from_std(timeout).unwrap_or(TimeDelta::MAX);
        let launched_at = presentation.launched_at;
        if self.clock.now() - launched_at < timeout {
            return Ok(None);
        }

        warn!(
            session_id = %session.id(),
            step_id = %presentation.config.origin.step_id(),
            "child app idle, failing the attempt"
        );
        let result = AppResult {
            source: HOST_SOURCE.to_owned(),
            app_name: Some(IDLE_WATCHDOG_APP.to_owned()),
            status: "failure".to_owned(),
            xp_delta: 0,
            reward_id: None,
            message: "no result before the idle timeout".to_owned(),
            timestamp: Some(launched_at.timestamp_millis()),
        };
        self.apply_result(session, result, correlation_id)
            .await
            .map(Some)
    }

    pub(crate) fn launch_app_step(&self, session: &mut FlowSession, step: &FlowStep) {
        let Some(media) = session.current_media() else {
            warn!(step_id = %step.id, "app step without app media");
            return;
        };
        let app = media.app().cloned().unwrap_or_default();
        let url = media.file.clone();
        let options = if app.options.is_empty() {
            step.options.clone()
        } else {
            app.options
        };
        let config = LaunchConfig {
            origin: LaunchOrigin::AppStep { step_id: step.id },
            url,
            app_data: app.app_config.to_string(),
            success_reward_id: outcome_reward(&options, "success"),
            failure_reward_id: outcome_reward(&options, "failure"),
            options,
        };
        session.bridge.launch(config, self.clock.now());
        info!(step_id = %step.id, "child app launched");
    }

    pub(crate) fn launch_hotspot_app(
        &self,
        session: &mut FlowSession,
        step: &FlowStep,
        hotspot: &HotspotConfig,
    ) {
        let app_data = hotspot
            .app_config
            .as_ref()
            .map_or_else(|| "{}".to_owned(), ToString::to_string);
        let config = LaunchConfig {
            origin: LaunchOrigin::Hotspot {
                step_id: step.id,
                mesh_name: hotspot.mesh_name.clone(),
            },
            url: hotspot.url.clone(),
            app_data,
            success_reward_id: hotspot.success_reward_id,
            failure_reward_id: hotspot.failure_reward_id,
            options: step.options.clone(),
        };
        session.bridge.launch(config, self.clock.now());
        info!(step_id = %step.id, mesh_name = %hotspot.mesh_name, "hotspot app launched");
    }

    async fn apply_result(
        &self,
        session: &mut FlowSession,
        result: AppResult,
        correlation_id: Uuid,
    ) -> Result<BridgeOutcome, DomainError> {
        let Some((step_id, attempt_id)) = session
            .bridge
            .presentation()
            .map(|p| (p.config.origin.step_id(), p.attempt_id))
        else {
            info!(app = result.app_label(), "result arrived with no open app");
            return Ok(BridgeOutcome::Ignored {
                reason: IgnoreReason::NoOpenPresentation,
            });
        };
        if !session.bridge.record(MessageIdentity::of(&result, step_id, attempt_id)) {
            info!(app = result.app_label(), %step_id, "duplicate result dropped");
            return Ok(BridgeOutcome::Ignored {
                reason: IgnoreReason::Duplicate,
            });
        }
        let Some(presentation) = session.bridge.close() else {
            return Ok(BridgeOutcome::Ignored {
                reason: IgnoreReason::NoOpenPresentation,
            });
        };
        info!(app = result.app_label(), status = %result.status, xp_delta = result.xp_delta, "applying app result");

        let player_id = session.player_id();
        if result.xp_delta != 0 {
            let reason = format!("app:{}", result.app_label());
            let applied = self
                .ledger
                .apply_xp_delta(player_id, result.xp_delta, &reason, correlation_id)
                .await;
            absorb(session, applied, "apply app xp");
        }
        if let Some(reward_id) = result.reward_id {
            self.grant(session, reward_id, correlation_id).await;
        }
        let refreshed = self.ledger.stats(player_id).await;
        absorb(session, refreshed, "refresh stats");

        let Some(option) = option_for_status(&presentation.config.options, &result.status).cloned()
        else {
            warn!(%step_id, status = %result.status, "no outcome matches the app status");
            if matches!(presentation.config.origin, LaunchOrigin::AppStep { .. }) {
                session.bridge.reopen(presentation);
            }
            return Ok(BridgeOutcome::Applied {
                status: result.status,
                transition: stayed(StayReason::NoMatchingOption),
            });
        };
        let transition = self
            .take_option(session, &option, correlation_id)
            .await;
        Ok(BridgeOutcome::Applied {
            status: result.status,
            transition,
        })
    }
}

fn outcome_reward(options: &[DecisionOption], status: &str) -> Option<RewardId> {
    option_for_status(options, status).and_then(|option| option.reward_id)
}
