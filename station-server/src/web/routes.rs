//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use tracing::warn;

use crate::ranker::Policy;
use crate::session::SessionError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/session/start", post(start_session))
        .route("/session/stop", post(stop_session))
        .route("/session/policy", get(get_policy).put(put_policy))
        .route("/location", post(post_location))
        .route("/stations", get(list_stations))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Start the live search.
async fn start_session(State(state): State<AppState>) -> Result<Json<SessionResponse>, AppError> {
    state.session.start()?;
    Ok(Json(SessionResponse { active: true }))
}

/// Stop the live search. Idempotent.
async fn stop_session(State(state): State<AppState>) -> Json<SessionResponse> {
    state.session.stop();
    Json(SessionResponse { active: false })
}

/// Read the current policy.
async fn get_policy(State(state): State<AppState>) -> Json<Policy> {
    Json(state.session.policy())
}

/// Replace the policy.
///
/// While the search is active this triggers an immediate fresh cycle and
/// restarts the periodic timer. The policy is also persisted so a restart
/// comes back with the same settings.
async fn put_policy(
    State(state): State<AppState>,
    Json(policy): Json<Policy>,
) -> Result<Json<Policy>, AppError> {
    state.session.set_policy(policy.clone()).await?;

    if let Err(e) = state.settings.save(&policy) {
        // Persistence is best-effort; the session already runs the new
        // policy.
        warn!(error = %e, "failed to persist policy");
    }

    Ok(Json(policy))
}

/// Deliver a location fix.
async fn post_location(
    State(state): State<AppState>,
    Json(req): Json<LocationUpdateRequest>,
) -> Result<StatusCode, AppError> {
    if !(-90.0..=90.0).contains(&req.lat_deg) || !(-180.0..=180.0).contains(&req.lon_deg) {
        return Err(AppError::BadRequest {
            message: format!("coordinates out of range: {},{}", req.lat_deg, req.lon_deg),
        });
    }

    state.session.update_location(req.into_sample(Utc::now()));
    Ok(StatusCode::NO_CONTENT)
}

/// Read the ranked-station snapshot.
async fn list_stations(State(state): State<AppState>) -> Json<StationsResponse> {
    let snapshot = state.session.snapshot();
    Json(StationsResponse::from_snapshot(&snapshot, Utc::now()))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Conflict { message: String },
    Internal { message: String },
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::AlreadyActive => AppError::Conflict {
                message: e.to_string(),
            },
            SessionError::InvalidPolicy(_) => AppError::BadRequest {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        warn!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
