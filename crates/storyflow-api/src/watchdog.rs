//! Background sweep failing child apps that never report a result.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::AppState;

/// Polls every open session once. Returns how many idle apps were failed.
pub async fn sweep_idle(state: &AppState) -> usize {
    let mut fired = 0;
    for shared in state.sessions().await {
        let mut session = shared.lock().await;
        match state.engine.poll_idle(&mut session, Uuid::new_v4()).await {
            Ok(Some(outcome)) => {
                fired += 1;
                info!(session_id = %session.id(), ?outcome, "idle child app failed");
            }
            Ok(None) => {}
            Err(err) => warn!(session_id = %session.id(), error = %err, "idle sweep failed"),
        }
    }
    fired
}

/// Runs [`sweep_idle`] every `period` until the runtime shuts down.
#[must_use]
pub fn spawn(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep_idle(&state).await;
        }
    })
}
