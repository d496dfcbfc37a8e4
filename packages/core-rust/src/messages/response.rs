//! Outbound response envelope and the outcome-code classifier.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Outcome code attached to successful responses.
pub const STATUS_OK: u16 = 200;

const STATUS_BAD_REQUEST: u16 = 400;
const STATUS_UNAUTHORIZED: u16 = 401;
const STATUS_FORBIDDEN: u16 = 403;
const STATUS_NOT_FOUND: u16 = 404;
const STATUS_CONFLICT: u16 = 409;
const STATUS_INTERNAL: u16 = 500;

/// Maps a domain error to its wire outcome code.
///
/// The table is closed. Kinds without an explicit row (token setup
/// failures, unknown operations) fall back to the internal code; token
/// verification failures surface as unauthorized so callers can retry with
/// fresh credentials.
#[must_use]
pub fn status_code(err: &DomainError) -> u16 {
    match err {
        DomainError::DataNotFound => STATUS_NOT_FOUND,
        DomainError::ConflictingData => STATUS_CONFLICT,
        DomainError::InvalidCredentials
        | DomainError::Unauthorized
        | DomainError::EmptyAuthHeader
        | DomainError::InvalidAuthHeader
        | DomainError::InvalidAuthType
        | DomainError::ExpiredToken
        | DomainError::InvalidToken => STATUS_UNAUTHORIZED,
        DomainError::Forbidden => STATUS_FORBIDDEN,
        DomainError::NoUpdatedData => STATUS_BAD_REQUEST,
        DomainError::Internal
        | DomainError::TokenDuration
        | DomainError::TokenCreation
        | DomainError::UnknownOperation => STATUS_INTERNAL,
    }
}

// ---------------------------------------------------------------------------
// ResponseMessage
// ---------------------------------------------------------------------------

/// One response published to the output destination.
///
/// Invariants: `success` is true iff `status_code` is the success code, and
/// exactly one of `message`/`error` is populated per the success flag
/// (both may legally be empty strings, e.g. a successful delete).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMessage {
    pub success: bool,
    pub status_code: u16,
    pub message: String,
    pub error: String,
}

impl ResponseMessage {
    /// Builds the envelope for a dispatch outcome.
    #[must_use]
    pub fn from_result(result: &Result<Vec<u8>, DomainError>) -> Self {
        match result {
            Ok(payload) => Self {
                success: true,
                status_code: STATUS_OK,
                message: String::from_utf8_lossy(payload).into_owned(),
                error: String::new(),
            },
            Err(err) => Self {
                success: false,
                status_code: status_code(err),
                message: String::new(),
                error: err.to_string(),
            },
        }
    }

    /// Serialized wire form.
    ///
    /// Envelope serialization must never fail the pipeline; there is no
    /// further escalation channel at this stage, so a failure yields an
    /// empty body.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
