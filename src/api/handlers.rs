//! HTTP request handlers

use super::types::{ErrorResponse, HealthResponse, Update, WebhookResponse};
use super::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(receive_update))
        .route("/healthz", get(health))
        .with_state(state)
}

/// Receive one transport update and hand it to the runtime. The handler
/// only enqueues; flow processing happens on the user's worker.
async fn receive_update(
    State(state): State<AppState>,
    Json(update): Json<Update>,
) -> Result<Json<WebhookResponse>, AppError> {
    let Some(incoming) = update.into_incoming() else {
        // Update kinds we do not handle are acknowledged and dropped
        return Ok(Json(WebhookResponse { ok: true }));
    };

    tracing::debug!(
        identity = incoming.identity,
        message_id = %incoming.message_id,
        kind = incoming.shape.kind(),
        "Inbound message"
    );

    state
        .dispatcher
        .dispatch(incoming)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(WebhookResponse { ok: true }))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler error type
#[derive(Debug)]
pub enum AppError {
    #[allow(dead_code)] // Reserved for request validation
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
