//! Ports connecting the transports to the domain and the domain to its
//! infrastructure. The dispatcher and the HTTP handlers only ever see
//! `AuthApi`/`UserApi`; services only ever see `UserStore`/`Cache`.

use std::time::Duration;

use async_trait::async_trait;
use roster_core::{DomainError, NewUser, User, UserUpdate};

/// Authentication operations consumed by both transports.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Authenticates an email/password pair and returns serialized token
    /// bytes on success.
    async fn login(&self, email: &str, password: &str) -> Result<Vec<u8>, DomainError>;
}

/// User CRUD operations consumed by both transports.
#[async_trait]
pub trait UserApi: Send + Sync {
    async fn register(&self, new: NewUser) -> Result<User, DomainError>;
    async fn get_user(&self, id: u64) -> Result<User, DomainError>;
    /// `offset` is a 1-based page number; `limit` is the page size.
    async fn list_users(&self, offset: u64, limit: u64) -> Result<Vec<User>, DomainError>;
    async fn update_user(&self, update: UserUpdate) -> Result<User, DomainError>;
    async fn delete_user(&self, id: u64) -> Result<(), DomainError>;
}

/// Persistence port. `password` fields crossing this boundary carry argon2
/// hashes, never cleartext.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, new: &NewUser, password_hash: &str) -> Result<User, DomainError>;
    async fn get_by_id(&self, id: u64) -> Result<User, DomainError>;
    async fn get_by_email(&self, email: &str) -> Result<User, DomainError>;
    /// `skip` is a row offset, already resolved from page semantics.
    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<User>, DomainError>;
    async fn update(&self, update: &UserUpdate) -> Result<User, DomainError>;
    async fn delete(&self, id: u64) -> Result<(), DomainError>;
}

/// Cache port. Values are opaque bytes (the services store JSON).
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError>;
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>)
        -> Result<(), DomainError>;
    async fn delete(&self, key: &str) -> Result<(), DomainError>;
    /// Removes every key starting with `prefix`.
    async fn delete_by_prefix(&self, prefix: &str) -> Result<(), DomainError>;
}
