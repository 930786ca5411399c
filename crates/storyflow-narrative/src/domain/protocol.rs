//! The child-application message protocol.
//!
//! Host to child: one [`HostMessage`] per launch, posted after the child
//! signals it is ready. Child to host: [`ChildMessage`], parsed from the raw
//! JSON the child posts.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use storyflow_core::error::DomainError;
use storyflow_core::ids::{RewardId, StepId};
use storyflow_ledger::domain::stats::InventoryItem;
use uuid::Uuid;

/// `source` of every message the host posts.
pub const HOST_SOURCE: &str = "host";
/// `type` of a child's result message.
pub const APP_RESULT_TYPE: &str = "app-result";
/// `type` of a child's ready signal.
pub const APP_READY_TYPE: &str = "app-ready";
/// `action` of a child's close request.
pub const CLOSE_ACTION: &str = "close";

/// Player state shared with a child app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub inventory: Vec<InventoryItem>,
    pub xp_total: i64,
}

/// Configuration posted to a child app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostMessage {
    pub source: String,
    /// Step-specific configuration, as a JSON string.
    pub app_data: String,
    pub player_stats: PlayerSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_reward_id: Option<RewardId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reward_id: Option<RewardId>,
    pub locale: String,
}

/// A child app's reported outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppResult {
    pub source: String,
    pub app_name: Option<String>,
    /// Matched against option texts, e.g. `success` or `failure`.
    pub status: String,
    /// Signed XP change; `0` when absent.
    pub xp_delta: i64,
    pub reward_id: Option<RewardId>,
    pub message: String,
    /// Child-supplied send time, if any.
    pub timestamp: Option<i64>,
}

impl AppResult {
    /// The app name, falling back to the message source.
    #[must_use]
    pub fn app_label(&self) -> &str {
        self.app_name.as_deref().unwrap_or(&self.source)
    }
}

/// A message posted by a child app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildMessage {
    Result(AppResult),
    /// Close the presentation without a transition.
    Close { source: String },
    /// The child is listening; the launch payload may be posted.
    Ready { source: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChildMessage {
    source: String,
    #[serde(default)]
    app_name: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    xp_delta: Option<f64>,
    #[serde(default, rename = "costoXP")]
    costo_xp: Option<f64>,
    #[serde(default, alias = "recompensaId")]
    reward_id: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    timestamp: Option<i64>,
}

#[allow(clippy::cast_possible_truncation)]
fn whole_xp(value: f64) -> i64 {
    value.round() as i64
}

impl ChildMessage {
    /// Parses a raw child message.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the value has no `source`, is not a
    /// known message kind, or is a result without a status.
    pub fn parse(value: &Value) -> Result<Self, DomainError> {
        let raw: RawChildMessage = serde_json::from_value(value.clone())
            .map_err(|e| DomainError::Validation(format!("malformed child message: {e}")))?;

        if raw.action.as_deref() == Some(CLOSE_ACTION) {
            return Ok(Self::Close { source: raw.source });
        }
        match raw.kind.as_deref() {
            Some(APP_READY_TYPE) => Ok(Self::Ready { source: raw.source }),
            Some(APP_RESULT_TYPE) => {
                let status = raw
                    .status
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| DomainError::Validation("app-result without status".into()))?;
                let xp_delta = raw.xp_delta.or(raw.costo_xp).map_or(0, whole_xp);
                Ok(Self::Result(AppResult {
                    source: raw.source,
                    app_name: raw.app_name,
                    status,
                    xp_delta,
                    reward_id: raw.reward_id.filter(|id| *id > 0).map(RewardId),
                    message: raw.message.unwrap_or_default(),
                    timestamp: raw.timestamp,
                }))
            }
            other => Err(DomainError::Validation(format!(
                "unsupported child message type {other:?}"
            ))),
        }
    }
}

/// Synthetic identity of one delivered result, used to drop re-posts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageIdentity(String);

impl MessageIdentity {
    /// SHA-256 over the launch attempt, app name, the step the attempt
    /// belongs to, status, reward id and the child's timestamp.
    #[must_use]
    pub fn of(result: &AppResult, step_id: StepId, attempt_id: Uuid) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(attempt_id.as_bytes());
        hasher.update(b"|");
        hasher.update(result.app_label().as_bytes());
        hasher.update(b"|");
        hasher.update(step_id.get().to_be_bytes());
        hasher.update(b"|");
        hasher.update(result.status.as_bytes());
        hasher.update(b"|");
        hasher.update(result.reward_id.map_or(0, RewardId::get).to_be_bytes());
        hasher.update(b"|");
        if let Some(timestamp) = result.timestamp {
            hasher.update(timestamp.to_be_bytes());
        }
        let digest = hasher.finalize();
        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest {
            let _ = write!(hex, "{byte:02x}");
        }
        Self(hex)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
