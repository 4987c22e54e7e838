use axum::{Json, http::StatusCode, response::IntoResponse};
use delivery::DeliveryError;
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod server;
mod session;
mod sessions;
mod tally;

pub enum ServerError {
    Engine(EngineError),
    Delivery(DeliveryError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::UnknownCategory(_) | EngineError::UnknownLedger(_) => StatusCode::NOT_FOUND,
        EngineError::AlreadyExists(_) => StatusCode::CONFLICT,
        EngineError::EmptyName(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Persistence(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

fn status_for_delivery_error(err: &DeliveryError) -> StatusCode {
    match err {
        DeliveryError::Config(_) | DeliveryError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        DeliveryError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        DeliveryError::Network(_)
        | DeliveryError::Rejected { .. }
        | DeliveryError::Telegram(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Delivery(err) => {
                tracing::error!("delivery failed: {err}");
                (status_for_delivery_error(&err), err.to_string())
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<DeliveryError> for ServerError {
    fn from(value: DeliveryError) -> Self {
        Self::Delivery(value)
    }
}
