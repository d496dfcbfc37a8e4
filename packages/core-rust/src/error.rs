//! Closed domain-error taxonomy.
//!
//! Every fallible operation in the system resolves to one of these kinds;
//! the response classifier in [`crate::messages::response`] maps each kind
//! to its wire outcome code. The display text is the `error` field callers
//! see, so it stays stable.

use thiserror::Error;

/// Errors surfaced by domain services, storage adapters, and the token
/// service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Unexpected infrastructure failure (database, cache, serialization).
    #[error("internal error")]
    Internal,
    /// The requested record does not exist.
    #[error("data not found")]
    DataNotFound,
    /// A unique column (e.g. email) already holds the submitted value.
    #[error("data conflicts with existing data")]
    ConflictingData,
    /// Email/password pair did not authenticate.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// Caller presented no usable identity.
    #[error("user is unauthorized to access the resource")]
    Unauthorized,
    /// Authorization header was absent or blank.
    #[error("authorization header is not provided")]
    EmptyAuthHeader,
    /// Authorization header did not split into scheme and credential.
    #[error("authorization header format is invalid")]
    InvalidAuthHeader,
    /// Authorization scheme was not `bearer`.
    #[error("authorization type is not supported")]
    InvalidAuthType,
    /// Caller is authenticated but lacks the required role.
    #[error("user is forbidden to access the resource")]
    Forbidden,
    /// An update carried no effective change.
    #[error("no data to update")]
    NoUpdatedData,
    /// The configured token lifetime could not be parsed.
    #[error("invalid token duration format")]
    TokenDuration,
    /// Sealing a fresh token failed.
    #[error("error creating token")]
    TokenCreation,
    /// The token was valid once but its expiration has elapsed.
    #[error("access token has expired")]
    ExpiredToken,
    /// The token failed decryption, decoding, or its not-before check.
    #[error("access token is invalid")]
    InvalidToken,
    /// The request envelope named an operation outside the routing table.
    #[error("unknown operation type")]
    UnknownOperation,
}
