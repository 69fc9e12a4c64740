//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{error, warn};

use crate::domain::{RequestId, RideId};
use crate::matching::{MatchError, MatchOutcome};
use crate::store::{RequestStore, RideStore, StoreError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/requests", post(create_request))
        .route("/requests/pending", get(pending_requests))
        .route("/requests/:request_id/cancel", post(cancel_request))
        .route("/match/trigger", post(trigger_match))
        .route("/rides/:ride_id", get(get_ride))
        .route("/rides/:ride_id/accept", post(accept_ride))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Create a pending ride request.
async fn create_request(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CreateRequestResponse>, AppError> {
    // Parse JSON manually so a missing field is a 400 with a useful message
    let req: CreateRequestBody = serde_json::from_slice(&body).map_err(|e| {
        warn!(body = %String::from_utf8_lossy(&body), "invalid create request: {e}");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;

    let request = state.store().insert_request(req.into_new_request())?;
    state.save_snapshot();

    Ok(Json(CreateRequestResponse {
        request_id: request.id.0,
    }))
}

/// List pending requests, oldest first.
async fn pending_requests(
    State(state): State<AppState>,
) -> Result<Json<Vec<RequestView>>, AppError> {
    let pending = state.store().list_pending()?;
    Ok(Json(pending.iter().map(RequestView::from_request).collect()))
}

/// Cancel a pending request.
async fn cancel_request(
    State(state): State<AppState>,
    Path(request_id): Path<u64>,
) -> Result<Json<CancelResponse>, AppError> {
    let request = state.matcher.cancel_request(RequestId(request_id)).await?;
    state.save_snapshot();

    Ok(Json(CancelResponse {
        status: request.status,
        request_id: request.id.0,
    }))
}

/// Run one matching pass now.
async fn trigger_match(
    State(state): State<AppState>,
    Query(query): Query<TriggerMatchQuery>,
) -> Result<Json<MatchResponse>, AppError> {
    let config = state.matcher.config();
    let max_seats = query.max_seats.unwrap_or(config.max_seats);
    let max_luggage = query.max_luggage.unwrap_or(config.max_luggage);

    let outcome = state
        .matcher
        .run_matching_pass(max_seats, max_luggage)
        .await?;
    if let MatchOutcome::Completed { rides } = &outcome
        && !rides.is_empty()
    {
        state.save_snapshot();
    }

    Ok(Json(MatchResponse::from_outcome(&outcome)))
}

/// Ride details.
async fn get_ride(
    State(state): State<AppState>,
    Path(ride_id): Path<u64>,
) -> Result<Json<RideView>, AppError> {
    let ride = state.store().get_ride(RideId(ride_id))?;
    Ok(Json(RideView::from_ride(&ride)))
}

/// Accept a proposed ride.
async fn accept_ride(
    State(state): State<AppState>,
    Path(ride_id): Path<u64>,
) -> Result<Json<AcceptResponse>, AppError> {
    let id = RideId(ride_id);
    let status = state.matcher.accept_ride(id).await?;
    state.save_snapshot();

    Ok(Json(AcceptResponse::new(id, status)))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    Unavailable { message: String },
    Internal { message: String },
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        let message = e.to_string();
        match e {
            StoreError::RequestNotFound(_) | StoreError::RideNotFound(_) => {
                AppError::NotFound { message }
            }
            StoreError::Validation(_) | StoreError::InvalidRideTransition { .. } => {
                AppError::BadRequest { message }
            }
            StoreError::InvalidRequestTransition { .. } | StoreError::AlreadyAssigned { .. } => {
                AppError::Conflict { message }
            }
            StoreError::Poisoned | StoreError::Snapshot { .. } => AppError::Internal { message },
        }
    }
}

impl From<MatchError> for AppError {
    fn from(e: MatchError) -> Self {
        match e {
            MatchError::Store(e) => e.into(),
            MatchError::LockTimeout { .. } => AppError::Unavailable {
                message: e.to_string(),
            },
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::Conflict { message }
            | AppError::Unavailable { message }
            | AppError::Internal { message } => message,
        };

        if status.is_server_error() {
            error!(%status, "{message}");
        } else {
            warn!(%status, "{message}");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
