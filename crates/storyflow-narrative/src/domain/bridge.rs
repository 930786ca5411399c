//! Per-session state of the child-app bridge.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use storyflow_catalog::domain::step::DecisionOption;
use storyflow_core::ids::{RewardId, StepId};
use uuid::Uuid;

use super::protocol::MessageIdentity;

/// Where a child app was launched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LaunchOrigin {
    /// The media of an `app` step.
    AppStep { step_id: StepId },
    /// An `interactive` hotspot of a 3D step.
    Hotspot { step_id: StepId, mesh_name: String },
}

impl LaunchOrigin {
    #[must_use]
    pub fn step_id(&self) -> StepId {
        match self {
            Self::AppStep { step_id } | Self::Hotspot { step_id, .. } => *step_id,
        }
    }
}

/// Everything needed to build the launch payload once the child is ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub origin: LaunchOrigin,
    /// URL of the child app.
    pub url: String,
    /// Configuration forwarded as `appData`.
    pub app_data: String,
    pub success_reward_id: Option<RewardId>,
    pub failure_reward_id: Option<RewardId>,
    /// Outcomes the reported status is matched against.
    pub options: Vec<DecisionOption>,
}

/// An open child-app presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPresentation {
    pub config: LaunchConfig,
    /// Distinguishes this attempt from earlier launches of the same app, so
    /// result identities only collide within one attempt.
    pub attempt_id: Uuid,
    pub launched_at: DateTime<Utc>,
    /// Set once the child signalled ready and the payload was released.
    pub ready: bool,
}

/// Dedupe table and open presentation of one session.
#[derive(Debug, Clone, Default)]
pub struct BridgeState {
    processed: HashSet<MessageIdentity>,
    presentation: Option<AppPresentation>,
}

impl BridgeState {
    /// Opens a presentation as a new attempt, replacing any open one.
    pub fn launch(&mut self, config: LaunchConfig, launched_at: DateTime<Utc>) {
        self.presentation = Some(AppPresentation {
            config,
            attempt_id: Uuid::new_v4(),
            launched_at,
            ready: false,
        });
    }

    /// Reopens a closed presentation within the same attempt. The child has
    /// to signal ready again.
    pub fn reopen(&mut self, mut presentation: AppPresentation) {
        presentation.ready = false;
        self.presentation = Some(presentation);
    }

    #[must_use]
    pub fn presentation(&self) -> Option<&AppPresentation> {
        self.presentation.as_ref()
    }

    /// Marks the open presentation ready. Returns its config, or `None` if
    /// nothing is open.
    pub fn mark_ready(&mut self) -> Option<&LaunchConfig> {
        let presentation = self.presentation.as_mut()?;
        presentation.ready = true;
        Some(&presentation.config)
    }

    /// Closes the open presentation and returns it.
    pub fn close(&mut self) -> Option<AppPresentation> {
        self.presentation.take()
    }

    /// Records a delivered result. Returns `false` if it was seen before.
    pub fn record(&mut self, identity: MessageIdentity) -> bool {
        self.processed.insert(identity)
    }

    #[must_use]
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }
}
