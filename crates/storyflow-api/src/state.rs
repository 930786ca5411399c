//! Shared application state.

use std::collections::HashMap;
use std::sync::Arc;

use storyflow_core::error::DomainError;
use storyflow_core::ids::SessionId;
use storyflow_ledger::application::ports::PlayerStateStore;
use storyflow_narrative::application::engine::FlowEngine;
use storyflow_narrative::domain::session::FlowSession;
use tokio::sync::{Mutex, RwLock};

/// A session behind its own lock, so operations on one session run one at a
/// time while different sessions proceed independently.
pub type SharedSession = Arc<Mutex<FlowSession>>;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The flow engine.
    pub engine: Arc<FlowEngine>,
    /// Player profiles, read directly by dashboard queries.
    pub player_store: Arc<dyn PlayerStateStore>,
    sessions: Arc<RwLock<HashMap<SessionId, SharedSession>>>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(engine: FlowEngine, player_store: Arc<dyn PlayerStateStore>) -> Self {
        Self {
            engine: Arc::new(engine),
            player_store,
            sessions: Arc::default(),
        }
    }

    /// Registers a freshly opened session.
    pub async fn insert_session(&self, session: FlowSession) -> SharedSession {
        let id = session.id();
        let shared = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, shared.clone());
        shared
    }

    /// Looks a session up.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown session id.
    pub async fn session(&self, id: SessionId) -> Result<SharedSession, DomainError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("session", id))
    }

    /// Drops a session from the registry.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown session id.
    pub async fn remove_session(&self, id: SessionId) -> Result<(), DomainError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("session", id))
    }

    /// Snapshot of every open session.
    pub async fn sessions(&self) -> Vec<SharedSession> {
        self.sessions.read().await.values().cloned().collect()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{TimeZone, Utc};
    use storyflow_ledger::application::ledger::RewardLedger;
    use storyflow_ledger::application::notifier::StatsNotifier;
    use storyflow_narrative::application::engine::EngineConfig;
    use storyflow_test_support::{FixedClock, InMemoryCatalogSource, RecordingPlayerStore, fixtures};

    use super::*;

    pub(crate) fn app_state_with(config: EngineConfig) -> AppState {
        let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()));
        let store = Arc::new(RecordingPlayerStore::new());
        let ledger = RewardLedger::new(store.clone(), clock.clone(), StatsNotifier::default());
        let source = Arc::new(InMemoryCatalogSource::new(fixtures::catalog_document()));
        AppState::new(FlowEngine::new(source, ledger, clock, config), store)
    }

    pub(crate) fn test_app_state() -> AppState {
        app_state_with(EngineConfig::default())
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let state = test_app_state();

        let result = state.session(SessionId::new_v7()).await;

        assert!(matches!(result, Err(DomainError::NotFound { entity: "session", .. })));
    }

    #[tokio::test]
    async fn test_remove_session_drops_it_from_the_registry() {
        // Arrange
        let state = test_app_state();
        let session = state
            .engine
            .open_session(storyflow_core::ids::PlayerId(uuid::Uuid::new_v4()), "es")
            .await
            .unwrap();
        let id = session.id();
        state.insert_session(session).await;

        // Act
        let removed = state.remove_session(id).await;
        let again = state.remove_session(id).await;

        // Assert
        assert!(removed.is_ok());
        assert!(matches!(again, Err(DomainError::NotFound { entity: "session", .. })));
        assert_eq!(state.session_count().await, 0);
        assert!(state.sessions().await.is_empty());
    }
}
