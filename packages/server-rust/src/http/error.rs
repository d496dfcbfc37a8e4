//! Domain-error to HTTP-response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use roster_core::{status_code, DomainError, ResponseMessage};

/// Wrapper letting handlers bubble [`DomainError`] with `?`.
///
/// The body reuses the broker's response envelope so both transports
/// report failures identically, and the status comes from the shared
/// classification table.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(status_code(&self.0))
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ResponseMessage::from_result(&Err(self.0));
        (status, Json(body)).into_response()
    }
}
