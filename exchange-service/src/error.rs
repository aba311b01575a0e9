//! HTTP-boundary error mapping (spec §7), analogous to the reference
//! `exchange-service/src/main.rs`'s `AppError`. Bodies reuse
//! [`engine::WireResult`]'s `{timestamp, success, message, code}` shape so
//! REST and the synchronous order-submission channel report failures the
//! same way.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use engine::{EngineError, WireResult};

#[derive(Debug)]
pub enum AppError {
    Engine(EngineError),
    SymbolNotFound(String),
    MissingUserHeader,
    InvalidUserHeader,
    InvalidSide(String),
    Calendar(calendar::CalendarError),
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, result) = match self {
            AppError::Engine(err) => {
                let code = err.code();
                let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
                (status, WireResult::rejected(now_millis(), err.to_string(), code))
            }
            AppError::SymbolNotFound(symbol) => (
                StatusCode::NOT_FOUND,
                WireResult::rejected(now_millis(), format!("symbol {symbol} not found"), 404),
            ),
            AppError::MissingUserHeader => (
                StatusCode::BAD_REQUEST,
                WireResult::rejected(now_millis(), "missing X-User-Id header", 400),
            ),
            AppError::InvalidUserHeader => (
                StatusCode::BAD_REQUEST,
                WireResult::rejected(now_millis(), "X-User-Id header is not a valid integer", 400),
            ),
            AppError::InvalidSide(side) => (
                StatusCode::BAD_REQUEST,
                WireResult::rejected(now_millis(), format!("side must be 'buy' or 'sell', got '{side}'"), 400),
            ),
            AppError::Calendar(err) => (
                StatusCode::SERVICE_UNAVAILABLE,
                WireResult::rejected(now_millis(), err.to_string(), 503),
            ),
        };
        (status, Json(result)).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        AppError::Engine(err)
    }
}

impl From<calendar::CalendarError> for AppError {
    fn from(err: calendar::CalendarError) -> Self {
        AppError::Calendar(err)
    }
}
