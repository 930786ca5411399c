//! Routes for player progression.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use storyflow_core::ids::PlayerId;
use storyflow_ledger::application::query_handlers::{self, DashboardSummary};
use storyflow_ledger::domain::stats::PlayerStats;
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /{player_id}/dashboard
#[instrument(skip(state), fields(player_id = %player_id))]
async fn get_dashboard(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
) -> Result<Json<DashboardSummary>, ApiError> {
    let summary = query_handlers::get_dashboard(player_id, state.player_store.as_ref()).await?;
    Ok(Json(summary))
}

/// Request body for recording a location visit.
#[derive(Debug, Deserialize)]
pub struct VisitLocationRequest {
    pub location_id: String,
}

/// POST /{player_id}/locations
#[instrument(skip(state, body), fields(player_id = %player_id))]
async fn visit_location(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
    Json(body): Json<VisitLocationRequest>,
) -> Result<Json<PlayerStats>, ApiError> {
    let stats = state
        .engine
        .ledger()
        .mark_location_visited(player_id, &body.location_id, Uuid::new_v4())
        .await?;
    Ok(Json(stats))
}

/// Returns the router for player queries.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{player_id}/dashboard", get(get_dashboard))
        .route("/{player_id}/locations", post(visit_location))
}
