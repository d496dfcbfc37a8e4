//! User CRUD with cache-aside reads and write-path invalidation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use roster_core::{DomainError, NewUser, User, UserUpdate};
use tracing::warn;

use crate::password;
use crate::traits::{Cache, UserApi, UserStore};

const CACHE_TTL: Duration = Duration::from_secs(600);
const USER_KEY_PREFIX: &str = "user:";
const LIST_KEY_PREFIX: &str = "users:";

fn user_key(id: u64) -> String {
    format!("{USER_KEY_PREFIX}{id}")
}

fn list_key(skip: u64, limit: u64) -> String {
    format!("{LIST_KEY_PREFIX}{skip}:{limit}")
}

/// User CRUD behind the [`UserApi`] port.
///
/// Reads consult the cache first and fall back to the store; cache
/// failures never fail a request, they only cost the round trip. Writes
/// invalidate the affected user entry and every cached list page.
pub struct UserService {
    store: Arc<dyn UserStore>,
    cache: Arc<dyn Cache>,
}

impl UserService {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, cache: Arc<dyn Cache>) -> Self {
        Self { store, cache }
    }

    async fn cached<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).ok(),
            Ok(None) => None,
            Err(err) => {
                warn!(key, %err, "cache read failed, falling back to store");
                None
            }
        }
    }

    async fn store_in_cache<T: serde::Serialize>(&self, key: &str, value: &T) {
        let Ok(bytes) = serde_json::to_vec(value) else {
            return;
        };
        if let Err(err) = self.cache.set(key, &bytes, Some(CACHE_TTL)).await {
            warn!(key, %err, "cache write failed");
        }
    }

    async fn invalidate(&self, id: Option<u64>) {
        if let Some(id) = id {
            if let Err(err) = self.cache.delete(&user_key(id)).await {
                warn!(id, %err, "cache invalidation failed");
            }
        }
        if let Err(err) = self.cache.delete_by_prefix(LIST_KEY_PREFIX).await {
            warn!(%err, "list cache invalidation failed");
        }
    }
}

#[async_trait]
impl UserApi for UserService {
    async fn register(&self, new: NewUser) -> Result<User, DomainError> {
        let hash = password::hash(&new.password)?;
        let user = self.store.create(&new, &hash).await?;

        self.invalidate(None).await;
        self.store_in_cache(&user_key(user.id), &user).await;
        Ok(user)
    }

    async fn get_user(&self, id: u64) -> Result<User, DomainError> {
        let key = user_key(id);
        if let Some(user) = self.cached::<User>(&key).await {
            return Ok(user);
        }

        let user = self.store.get_by_id(id).await?;
        self.store_in_cache(&key, &user).await;
        Ok(user)
    }

    async fn list_users(&self, offset: u64, limit: u64) -> Result<Vec<User>, DomainError> {
        // `offset` is a 1-based page number on the wire.
        let skip = offset.saturating_sub(1).saturating_mul(limit);
        let key = list_key(skip, limit);
        if let Some(users) = self.cached::<Vec<User>>(&key).await {
            return Ok(users);
        }

        let users = self.store.list(skip, limit).await?;
        self.store_in_cache(&key, &users).await;
        Ok(users)
    }

    async fn update_user(&self, update: UserUpdate) -> Result<User, DomainError> {
        let existing = self.store.get_by_id(update.id).await?;

        // A supplied password always counts as a change: the stored hash
        // cannot be compared against cleartext.
        let unchanged = update
            .name
            .as_ref()
            .map_or(true, |name| *name == existing.name)
            && update
                .email
                .as_ref()
                .map_or(true, |email| *email == existing.email)
            && update.role.map_or(true, |role| role == existing.role)
            && update.password.is_none();
        if unchanged {
            return Err(DomainError::NoUpdatedData);
        }

        let mut update = update;
        if let Some(cleartext) = update.password.take() {
            update.password = Some(password::hash(&cleartext)?);
        }

        let user = self.store.update(&update).await?;
        self.invalidate(Some(user.id)).await;
        Ok(user)
    }

    async fn delete_user(&self, id: u64) -> Result<(), DomainError> {
        // Existence check first so a missing user answers 404, not a
        // silently successful no-op.
        self.store.get_by_id(id).await?;
        self.store.delete(id).await?;
        self.invalidate(Some(id)).await;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
