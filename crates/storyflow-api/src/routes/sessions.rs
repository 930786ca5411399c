//! Routes driving flow sessions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use storyflow_core::ids::{PlayerId, SessionId, StepId, StoryId};
use storyflow_narrative::application::app_bridge::BridgeOutcome;
use storyflow_narrative::application::engine::{Discovery, Transition};
use storyflow_narrative::application::query_handlers::{self, SessionView};
use storyflow_narrative::domain::commands;
use storyflow_narrative::domain::gate::GateStatus;
use storyflow_narrative::domain::locks::HubEntry;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

fn default_locale() -> String {
    "es".to_string()
}

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    /// The player whose progression the session reads and writes.
    pub player_id: Uuid,
    /// Locale forwarded to child apps.
    #[serde(default = "default_locale")]
    pub locale: String,
}

/// Request body for POST /{session_id}/story.
#[derive(Debug, Deserialize)]
pub struct SelectStoryRequest {
    pub story_id: StoryId,
}

/// Request body for POST /{session_id}/advance.
#[derive(Debug, Default, Deserialize)]
pub struct AdvanceRequest {
    /// The chosen option's target on decision steps; overrides the successor
    /// on narrative steps.
    #[serde(default)]
    pub target_step_id: Option<StepId>,
}

/// Request body for POST /{session_id}/media-ended.
#[derive(Debug, Deserialize)]
pub struct MediaEndedRequest {
    pub step_id: StepId,
}

/// Request body for POST /{session_id}/hotspots.
#[derive(Debug, Deserialize)]
pub struct DiscoverRequest {
    pub mesh_name: String,
}

/// Response body for commands that may move the session.
#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub transition: Transition,
    pub session: SessionView,
}

/// Response body for POST /{session_id}/hotspots.
#[derive(Debug, Serialize)]
pub struct DiscoveryResponse {
    pub discovery: Discovery,
    pub session: SessionView,
}

/// Response body for POST /{session_id}/overlay/dismiss.
#[derive(Debug, Serialize)]
pub struct GateResponse {
    pub gate: GateStatus,
    pub session: SessionView,
}

/// Response body for POST /{session_id}/app/messages.
#[derive(Debug, Serialize)]
pub struct BridgeResponse {
    pub outcome: BridgeOutcome,
    pub session: SessionView,
}

/// POST /
#[instrument(skip(state, request), fields(player_id = %request.player_id))]
async fn open_session(
    State(state): State<AppState>,
    Json(request): Json<OpenSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let session = state
        .engine
        .open_session(PlayerId(request.player_id), &request.locale)
        .await?;
    let view = query_handlers::view(&session);
    state.insert_session(session).await;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /{session_id}
#[instrument(skip(state), fields(session_id = %session_id))]
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<SessionView>, ApiError> {
    let shared = state.session(session_id).await?;
    let session = shared.lock().await;
    Ok(Json(query_handlers::view(&session)))
}

/// DELETE /{session_id}
#[instrument(skip(state), fields(session_id = %session_id))]
async fn close_session(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> Result<StatusCode, ApiError> {
    state.remove_session(session_id).await?;
    info!("session closed");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /{session_id}/hub
#[instrument(skip(state), fields(session_id = %session_id))]
async fn get_hub(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<Vec<HubEntry>>, ApiError> {
    let shared = state.session(session_id).await?;
    let session = shared.lock().await;
    Ok(Json(query_handlers::hub(&session)))
}

/// POST /{session_id}/hub
#[instrument(skip(state), fields(session_id = %session_id))]
async fn return_to_hub(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let command = commands::ReturnToHub {
        correlation_id: Uuid::new_v4(),
        session_id,
    };
    info!(correlation_id = %command.correlation_id, "handling return_to_hub command");

    let shared = state.session(session_id).await?;
    let mut session = shared.lock().await;
    let transition = state.engine.return_to_hub(&mut session, &command);
    Ok(Json(TransitionResponse {
        transition,
        session: query_handlers::view(&session),
    }))
}

/// POST /{session_id}/story
#[instrument(skip(state, request), fields(session_id = %session_id, story_id = %request.story_id))]
async fn select_story(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
    Json(request): Json<SelectStoryRequest>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let command = commands::SelectStory {
        correlation_id: Uuid::new_v4(),
        session_id,
        story_id: request.story_id,
    };
    info!(correlation_id = %command.correlation_id, "handling select_story command");

    let shared = state.session(session_id).await?;
    let mut session = shared.lock().await;
    let transition = state.engine.select_story(&mut session, &command).await?;
    Ok(Json(TransitionResponse {
        transition,
        session: query_handlers::view(&session),
    }))
}

/// POST /{session_id}/advance
#[instrument(skip(state, request), fields(session_id = %session_id))]
async fn advance(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
    Json(request): Json<AdvanceRequest>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let command = commands::AdvanceStep {
        correlation_id: Uuid::new_v4(),
        session_id,
        target_step_id: request.target_step_id,
    };
    info!(correlation_id = %command.correlation_id, "handling advance_step command");

    let shared = state.session(session_id).await?;
    let mut session = shared.lock().await;
    let transition = state.engine.advance(&mut session, &command).await?;
    Ok(Json(TransitionResponse {
        transition,
        session: query_handlers::view(&session),
    }))
}

/// POST /{session_id}/media-ended
#[instrument(skip(state, request), fields(session_id = %session_id, step_id = %request.step_id))]
async fn media_ended(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
    Json(request): Json<MediaEndedRequest>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let command = commands::ReportMediaEnded {
        correlation_id: Uuid::new_v4(),
        session_id,
        step_id: request.step_id,
    };
    info!(correlation_id = %command.correlation_id, "handling report_media_ended command");

    let shared = state.session(session_id).await?;
    let mut session = shared.lock().await;
    let transition = state.engine.media_ended(&mut session, &command).await?;
    Ok(Json(TransitionResponse {
        transition,
        session: query_handlers::view(&session),
    }))
}

/// POST /{session_id}/hotspots
#[instrument(skip(state, request), fields(session_id = %session_id, mesh_name = %request.mesh_name))]
async fn discover_hotspot(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
    Json(request): Json<DiscoverRequest>,
) -> Result<Json<DiscoveryResponse>, ApiError> {
    let command = commands::DiscoverHotspot {
        correlation_id: Uuid::new_v4(),
        session_id,
        mesh_name: request.mesh_name,
    };
    info!(correlation_id = %command.correlation_id, "handling discover_hotspot command");

    let shared = state.session(session_id).await?;
    let mut session = shared.lock().await;
    let discovery = state.engine.discover_hotspot(&mut session, &command).await?;
    Ok(Json(DiscoveryResponse {
        discovery,
        session: query_handlers::view(&session),
    }))
}

/// POST /{session_id}/overlay/dismiss
#[instrument(skip(state), fields(session_id = %session_id))]
async fn dismiss_overlay(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<GateResponse>, ApiError> {
    let command = commands::DismissOverlay {
        correlation_id: Uuid::new_v4(),
        session_id,
    };
    info!(correlation_id = %command.correlation_id, "handling dismiss_overlay command");

    let shared = state.session(session_id).await?;
    let mut session = shared.lock().await;
    let gate = state.engine.dismiss_overlay(&mut session, &command);
    Ok(Json(GateResponse {
        gate,
        session: query_handlers::view(&session),
    }))
}

/// POST /{session_id}/app/messages
///
/// Takes the message exactly as the child app posted it.
#[instrument(skip(state, payload), fields(session_id = %session_id))]
async fn deliver_child_message(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
    Json(payload): Json<Value>,
) -> Result<Json<BridgeResponse>, ApiError> {
    let command = commands::DeliverChildMessage {
        correlation_id: Uuid::new_v4(),
        session_id,
        payload,
    };
    info!(correlation_id = %command.correlation_id, "handling deliver_child_message command");

    let shared = state.session(session_id).await?;
    let mut session = shared.lock().await;
    let outcome = state
        .engine
        .deliver_child_message(&mut session, &command)
        .await?;
    Ok(Json(BridgeResponse {
        outcome,
        session: query_handlers::view(&session),
    }))
}

/// Returns the router for session commands and queries.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(open_session))
        .route("/{session_id}", get(get_session).delete(close_session))
        .route("/{session_id}/hub", get(get_hub).post(return_to_hub))
        .route("/{session_id}/story", post(select_story))
        .route("/{session_id}/advance", post(advance))
        .route("/{session_id}/media-ended", post(media_ended))
        .route("/{session_id}/hotspots", post(discover_hotspot))
        .route("/{session_id}/overlay/dismiss", post(dismiss_overlay))
        .route("/{session_id}/app/messages", post(deliver_child_message))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use storyflow_test_support::fixtures;
    use tower::ServiceExt;

    use crate::state::tests::test_app_state;

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap()
        };
        (status, json)
    }

    async fn open(app: &Router) -> String {
        let (status, json) = send(
            app.clone(),
            "POST",
            "/",
            Some(json!({ "player_id": Uuid::new_v4() })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        json["session_id"].as_str().unwrap().to_owned()
    }

    fn app() -> Router {
        router().with_state(test_app_state())
    }

    #[tokio::test]
    async fn test_open_session_returns_201_in_hub() {
        // Arrange
        let app = app();

        // Act
        let (status, json) = send(
            app,
            "POST",
            "/",
            Some(json!({ "player_id": Uuid::new_v4(), "locale": "en" })),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["phase"], "hub");
        assert_eq!(json["locale"], "en");
        assert_eq!(json["stats"]["level"], 1);
    }

    #[tokio::test]
    async fn test_hub_lists_locked_story() {
        let app = app();
        let id = open(&app).await;

        let (status, json) = send(app, "GET", &format!("/{id}/hub"), None).await;

        assert_eq!(status, StatusCode::OK);
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 7);
        assert_eq!(entries[1]["story_id"], fixtures::TUNNELS.get());
        assert_eq!(entries[1]["lock"]["required_story_id"], fixtures::PLAZA.get());
    }

    #[tokio::test]
    async fn test_unknown_session_returns_404() {
        let app = app();

        let (status, json) = send(app, "GET", &format!("/{}", Uuid::new_v4()), None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "not_found");
    }

    #[tokio::test]
    async fn test_close_session_removes_it() {
        // Arrange
        let state = test_app_state();
        let app = router().with_state(state.clone());
        let id = open(&app).await;

        // Act
        let (closed, _) = send(app.clone(), "DELETE", &format!("/{id}"), None).await;
        let (after, json) = send(app.clone(), "GET", &format!("/{id}"), None).await;
        let (again, _) = send(app, "DELETE", &format!("/{id}"), None).await;

        // Assert
        assert_eq!(closed, StatusCode::NO_CONTENT);
        assert_eq!(after, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "not_found");
        assert_eq!(again, StatusCode::NOT_FOUND);
        assert_eq!(state.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_select_locked_and_unknown_stories() {
        let app = app();
        let id = open(&app).await;

        let (locked_status, locked) = send(
            app.clone(),
            "POST",
            &format!("/{id}/story"),
            Some(json!({ "story_id": fixtures::TUNNELS.get() })),
        )
        .await;
        let (missing_status, missing) = send(
            app,
            "POST",
            &format!("/{id}/story"),
            Some(json!({ "story_id": 404 })),
        )
        .await;

        assert_eq!(locked_status, StatusCode::OK);
        assert_eq!(locked["transition"]["outcome"], "locked");
        assert_eq!(locked["session"]["phase"], "hub");
        assert_eq!(missing_status, StatusCode::NOT_FOUND);
        assert_eq!(missing["error"], "not_found");
    }

    #[tokio::test]
    async fn test_decision_flow_over_http() {
        // Arrange
        let app = app();
        let id = open(&app).await;
        send(
            app.clone(),
            "POST",
            &format!("/{id}/story"),
            Some(json!({ "story_id": fixtures::PLAZA.get() })),
        )
        .await;

        // Act
        let (_, intro) = send(app.clone(), "POST", &format!("/{id}/advance"), Some(json!({}))).await;
        let (status, choice) = send(
            app,
            "POST",
            &format!("/{id}/advance"),
            Some(json!({ "target_step_id": fixtures::PLAZA_GO.get() })),
        )
        .await;

        // Assert
        assert_eq!(intro["transition"]["step_id"], fixtures::PLAZA_CHOICE.get());
        assert_eq!(status, StatusCode::OK);
        assert_eq!(choice["transition"]["outcome"], "entered_step");
        assert_eq!(choice["session"]["step"]["id"], fixtures::PLAZA_GO.get());
        assert_eq!(choice["session"]["stats"]["known_characters"], 1);
    }

    #[tokio::test]
    async fn test_media_ended_for_other_step_is_stale() {
        let app = app();
        let id = open(&app).await;
        send(
            app.clone(),
            "POST",
            &format!("/{id}/story"),
            Some(json!({ "story_id": fixtures::CINEMA.get() })),
        )
        .await;

        let (status, json) = send(
            app,
            "POST",
            &format!("/{id}/media-ended"),
            Some(json!({ "step_id": fixtures::CINEMA_CHOICE.get() })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["transition"]["reason"], "stale_event");
        assert_eq!(json["session"]["gate"], "awaiting_playback");
    }

    #[tokio::test]
    async fn test_hotspot_discovery_and_overlay() {
        let app = app();
        let id = open(&app).await;
        send(
            app.clone(),
            "POST",
            &format!("/{id}/story"),
            Some(json!({ "story_id": fixtures::MARKET.get() })),
        )
        .await;

        let (_, gate) = send(app.clone(), "POST", &format!("/{id}/overlay/dismiss"), None).await;
        let (found_status, found) = send(
            app.clone(),
            "POST",
            &format!("/{id}/hotspots"),
            Some(json!({ "mesh_name": "a" })),
        )
        .await;
        let (missing_status, _) = send(
            app,
            "POST",
            &format!("/{id}/hotspots"),
            Some(json!({ "mesh_name": "nope" })),
        )
        .await;

        assert_eq!(gate["gate"], "awaiting_discovery");
        assert_eq!(found_status, StatusCode::OK);
        assert_eq!(found["discovery"]["newly_discovered"], true);
        assert_eq!(found["session"]["discovery"]["discovered"][0], "a");
        assert_eq!(missing_status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_child_app_messages() {
        // Arrange
        let app = app();
        let id = open(&app).await;
        send(
            app.clone(),
            "POST",
            &format!("/{id}/story"),
            Some(json!({ "story_id": fixtures::RENTAL.get() })),
        )
        .await;
        let uri = format!("/{id}/app/messages");

        // Act
        let (_, ready) = send(
            app.clone(),
            "POST",
            &uri,
            Some(json!({ "source": "RentalApp", "type": "app-ready" })),
        )
        .await;
        let (bad_status, bad) = send(app.clone(), "POST", &uri, Some(json!({ "type": "app-result" }))).await;
        let (_, applied) = send(
            app,
            "POST",
            &uri,
            Some(json!({ "source": "RentalApp", "type": "app-result", "status": "failure" })),
        )
        .await;

        // Assert
        assert_eq!(ready["outcome"]["outcome"], "ready");
        assert_eq!(ready["outcome"]["payload"]["appData"], r#"{"price":40}"#);
        assert_eq!(ready["outcome"]["payload"]["source"], "host");
        assert_eq!(bad_status, StatusCode::BAD_REQUEST);
        assert_eq!(bad["error"], "validation_error");
        assert_eq!(applied["outcome"]["outcome"], "applied");
        assert_eq!(applied["session"]["step"]["id"], fixtures::RENTAL_FAILURE.get());
    }

    #[tokio::test]
    async fn test_select_story_returns_422_for_missing_story_id() {
        let app = app();
        let id = open(&app).await;

        let (status, _) = send(app, "POST", &format!("/{id}/story"), Some(json!({}))).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_return_to_hub() {
        let app = app();
        let id = open(&app).await;
        send(
            app.clone(),
            "POST",
            &format!("/{id}/story"),
            Some(json!({ "story_id": fixtures::PLAZA.get() })),
        )
        .await;

        let (status, json) = send(app, "POST", &format!("/{id}/hub"), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["transition"]["outcome"], "returned_to_hub");
        assert!(json["session"]["step"].is_null());
    }
}
