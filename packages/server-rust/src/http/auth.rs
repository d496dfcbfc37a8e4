//! Bearer-token middleware and the admin guard.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use roster_core::{DomainError, TokenPayload, UserRole};

use crate::http::error::ApiError;
use crate::http::AppState;
use crate::token::TokenService;

const BEARER_SCHEME: &str = "bearer";

/// Verifies the bearer token and stashes the payload in request
/// extensions for the handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authorize(&state.token, request.headers()) {
        Ok(payload) => {
            request.extensions_mut().insert(payload);
            next.run(request).await
        }
        Err(err) => ApiError(err).into_response(),
    }
}

/// Extracts and verifies the `Authorization` header.
///
/// # Errors
///
/// `EmptyAuthHeader` when the header is absent or blank,
/// `InvalidAuthHeader` when it does not split into exactly scheme and
/// credential, `InvalidAuthType` for non-bearer schemes, and whatever the
/// token service returns for the credential itself.
pub fn authorize(token: &TokenService, headers: &HeaderMap) -> Result<TokenPayload, DomainError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(DomainError::EmptyAuthHeader)?;
    let value = header.to_str().map_err(|_| DomainError::InvalidAuthHeader)?;
    if value.trim().is_empty() {
        return Err(DomainError::EmptyAuthHeader);
    }

    let mut parts = value.split_whitespace();
    let (scheme, credential) = match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(credential), None) => (scheme, credential),
        _ => return Err(DomainError::InvalidAuthHeader),
    };
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(DomainError::InvalidAuthType);
    }

    token.verify(credential)
}

/// Admin-only guard for the write endpoints.
///
/// # Errors
///
/// Returns [`DomainError::Forbidden`] for non-admin callers.
pub fn ensure_admin(caller: &TokenPayload) -> Result<(), DomainError> {
    if caller.role == UserRole::Admin {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::HeaderValue;
    use chrono::Utc;
    use roster_core::User;
    use uuid::Uuid;

    use super::*;

    fn token_service() -> TokenService {
        TokenService::new(Duration::from_secs(900))
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn issued_token(service: &TokenService, role: UserRole) -> String {
        service
            .issue(&User {
                id: 9,
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                password: String::new(),
                role,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .unwrap()
    }

    #[test]
    fn missing_header_is_empty_auth_header() {
        let service = token_service();
        assert_eq!(
            authorize(&service, &HeaderMap::new()).unwrap_err(),
            DomainError::EmptyAuthHeader
        );
    }

    #[test]
    fn blank_header_is_empty_auth_header() {
        let service = token_service();
        assert_eq!(
            authorize(&service, &headers_with("  ")).unwrap_err(),
            DomainError::EmptyAuthHeader
        );
    }

    #[test]
    fn single_part_header_is_invalid_auth_header() {
        let service = token_service();
        assert_eq!(
            authorize(&service, &headers_with("Bearer")).unwrap_err(),
            DomainError::InvalidAuthHeader
        );
    }

    #[test]
    fn three_part_header_is_invalid_auth_header() {
        let service = token_service();
        assert_eq!(
            authorize(&service, &headers_with("Bearer a b")).unwrap_err(),
            DomainError::InvalidAuthHeader
        );
    }

    #[test]
    fn non_bearer_scheme_is_invalid_auth_type() {
        let service = token_service();
        assert_eq!(
            authorize(&service, &headers_with("Basic dXNlcjpwdw==")).unwrap_err(),
            DomainError::InvalidAuthType
        );
    }

    #[test]
    fn valid_bearer_token_authorizes() {
        let service = token_service();
        let token = issued_token(&service, UserRole::Basic);
        let payload = authorize(&service, &headers_with(&format!("Bearer {token}"))).unwrap();
        assert_eq!(payload.user_id, 9);
    }

    #[test]
    fn scheme_comparison_is_case_insensitive() {
        let service = token_service();
        let token = issued_token(&service, UserRole::Basic);
        assert!(authorize(&service, &headers_with(&format!("bearer {token}"))).is_ok());
    }

    #[test]
    fn forged_token_is_invalid() {
        let service = token_service();
        assert_eq!(
            authorize(&service, &headers_with("Bearer v1.local.AAAA")).unwrap_err(),
            DomainError::InvalidToken
        );
    }

    #[test]
    fn admin_guard_checks_the_role() {
        let admin = TokenPayload {
            id: Uuid::new_v4(),
            user_id: 1,
            role: UserRole::Admin,
        };
        let basic = TokenPayload {
            id: Uuid::new_v4(),
            user_id: 2,
            role: UserRole::Basic,
        };
        assert!(ensure_admin(&admin).is_ok());
        assert_eq!(ensure_admin(&basic).unwrap_err(), DomainError::Forbidden);
    }
}
