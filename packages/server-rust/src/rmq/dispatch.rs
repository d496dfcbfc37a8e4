//! Routes a decoded request envelope to its domain operation.

use std::sync::Arc;

use roster_core::{
    DomainError, NewUser, OperationKind, RequestMessage, UserRole, UserUpdate,
};
use serde::Serialize;

use crate::traits::{AuthApi, UserApi};

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>, DomainError> {
    serde_json::to_vec(value).map_err(|_| DomainError::Internal)
}

/// Dispatches request envelopes to the domain ports.
///
/// The routing table is exhaustive over [`OperationKind`]; the `Unknown`
/// arm answers with an explicit error so unroutable requests are rejected
/// visibly rather than dropped. Domain errors pass through unmodified --
/// no retries, no translation.
pub struct Dispatcher {
    auth: Arc<dyn AuthApi>,
    users: Arc<dyn UserApi>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(auth: Arc<dyn AuthApi>, users: Arc<dyn UserApi>) -> Self {
        Self { auth, users }
    }

    /// Runs one request to completion and returns the payload bytes the
    /// response envelope will carry.
    ///
    /// Fields required by an operation but absent from the envelope fall
    /// back to empty defaults; the domain layer then answers with the
    /// matching failure (e.g. `InvalidCredentials` for a login without a
    /// password), keeping caller errors out of the transport path.
    ///
    /// # Errors
    ///
    /// Whatever the invoked domain operation returns, plus
    /// [`DomainError::UnknownOperation`] for selectors outside the table.
    pub async fn dispatch(&self, request: RequestMessage) -> Result<Vec<u8>, DomainError> {
        match request.kind {
            OperationKind::Login => {
                let email = request.email.unwrap_or_default();
                let password = request.password.unwrap_or_default();
                self.auth.login(&email, &password).await
            }
            OperationKind::Signup => {
                let user = self
                    .users
                    .register(NewUser {
                        name: request.name.unwrap_or_default(),
                        email: request.email.unwrap_or_default(),
                        password: request.password.unwrap_or_default(),
                        role: request.role.unwrap_or(UserRole::Basic),
                    })
                    .await?;
                to_json(&user)
            }
            OperationKind::Update => {
                let user = self
                    .users
                    .update_user(UserUpdate {
                        id: request.uid.unwrap_or_default(),
                        name: request.name,
                        email: request.email,
                        password: request.password,
                        role: request.role,
                    })
                    .await?;
                to_json(&user)
            }
            OperationKind::Delete => {
                self.users
                    .delete_user(request.uid.unwrap_or_default())
                    .await?;
                Ok(Vec::new())
            }
            OperationKind::List => {
                let users = self
                    .users
                    .list_users(
                        request.offset.unwrap_or_default(),
                        request.limit.unwrap_or_default(),
                    )
                    .await?;
                to_json(&users)
            }
            OperationKind::Unknown => Err(DomainError::UnknownOperation),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
