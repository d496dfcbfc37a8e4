//! Login: credential check plus token issuance.

use std::sync::Arc;

use async_trait::async_trait;
use roster_core::DomainError;

use crate::password;
use crate::token::TokenService;
use crate::traits::{AuthApi, UserStore};

/// Authenticates users against the store and issues access tokens.
pub struct AuthService {
    store: Arc<dyn UserStore>,
    token: Arc<TokenService>,
}

impl AuthService {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, token: Arc<TokenService>) -> Self {
        Self { store, token }
    }
}

#[async_trait]
impl AuthApi for AuthService {
    /// A missing account and a wrong password both answer
    /// `InvalidCredentials` so callers cannot probe which emails exist;
    /// any other store failure collapses to `Internal`.
    async fn login(&self, email: &str, password: &str) -> Result<Vec<u8>, DomainError> {
        let user = match self.store.get_by_email(email).await {
            Ok(user) => user,
            Err(DomainError::DataNotFound) => return Err(DomainError::InvalidCredentials),
            Err(_) => return Err(DomainError::Internal),
        };

        password::verify(password, &user.password)?;

        let token = self
            .token
            .issue(&user)
            .map_err(|_| DomainError::TokenCreation)?;
        Ok(token.into_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
