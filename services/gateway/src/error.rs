use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use types::errors::EngineError;

/// HTTP-facing wrapper over the engine error taxonomy
#[derive(Debug)]
pub enum AppError {
    Engine(EngineError),
    BadRequest(String),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", message),
            AppError::Engine(err) => {
                let (status, code) = match &err {
                    EngineError::InvalidOrder { .. } => (StatusCode::BAD_REQUEST, "INVALID_ORDER"),
                    EngineError::InsufficientFunds { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_FUNDS")
                    }
                    EngineError::MarketUnavailable { .. } => {
                        (StatusCode::SERVICE_UNAVAILABLE, "MARKET_UNAVAILABLE")
                    }
                    EngineError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                    EngineError::InvalidState { .. } => (StatusCode::CONFLICT, "INVALID_STATE"),
                    EngineError::ConcurrencyConflict { .. } => {
                        (StatusCode::CONFLICT, "CONCURRENCY_CONFLICT")
                    }
                };
                (status, code, err.to_string())
            }
        };

        let body = Json(json!({
            "error": code,
            "message": message
        }));

        (status, body).into_response()
    }
}
