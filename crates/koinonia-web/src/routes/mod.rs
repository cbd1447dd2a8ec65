//! Route handlers.

pub mod cells;
pub mod consolidation;
pub mod health;
pub mod supervision;

use axum::http::StatusCode;
use koinonia_core::KoinoniaError;

/// Map a core error to an HTTP response pair.
pub fn to_http(e: KoinoniaError) -> (StatusCode, String) {
    let status = if e.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        match e {
            KoinoniaError::ValidationError(_) | KoinoniaError::InvalidStatusTransition { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    };
    (status, e.to_string())
}
