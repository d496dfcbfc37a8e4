//! PostgreSQL-backed user store.
//!
//! Queries are built at runtime (no compile-time database); rows map
//! through [`UserRow`] so the role/id conversions live in one place.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::error;

use roster_core::{DomainError, NewUser, User, UserRole, UserUpdate};

use crate::traits::UserStore;

const COLUMNS: &str = "id, name, email, password, role, created_at, updated_at";

/// Opens a connection pool against the configured database.
///
/// # Errors
///
/// Propagates the connect failure; callers treat it as startup-fatal.
pub async fn connect(url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
    Ok(pool)
}

/// Applies the embedded migrations.
///
/// # Errors
///
/// Propagates the migration failure; callers treat it as startup-fatal.
pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!().run(pool).await?;
    Ok(())
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, DomainError> {
        // Either conversion failing means the row was written outside this
        // store; surface it as an infrastructure fault.
        let id = u64::try_from(self.id).map_err(|_| DomainError::Internal)?;
        let role: UserRole = self.role.parse()?;
        Ok(User {
            id,
            name: self.name,
            email: self.email,
            password: self.password,
            role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn to_db_id(id: u64) -> Result<i64, DomainError> {
    i64::try_from(id).map_err(|_| DomainError::DataNotFound)
}

fn to_db_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn map_write_err(err: &sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = err {
        if db_err.is_unique_violation() {
            return DomainError::ConflictingData;
        }
    }
    error!(%err, "user store write failed");
    DomainError::Internal
}

fn map_read_err(err: &sqlx::Error) -> DomainError {
    error!(%err, "user store read failed");
    DomainError::Internal
}

/// PostgreSQL implementation of the [`UserStore`] port.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new: &NewUser, password_hash: &str) -> Result<User, DomainError> {
        let sql = format!(
            "INSERT INTO users (name, email, password, role) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&new.name)
            .bind(&new.email)
            .bind(password_hash)
            .bind(new.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_err(&e))?;
        row.into_user()
    }

    async fn get_by_id(&self, id: u64) -> Result<User, DomainError> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(to_db_id(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_read_err(&e))?;
        row.ok_or(DomainError::DataNotFound)?.into_user()
    }

    async fn get_by_email(&self, email: &str) -> Result<User, DomainError> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_read_err(&e))?;
        row.ok_or(DomainError::DataNotFound)?.into_user()
    }

    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<User>, DomainError> {
        let sql = format!("SELECT {COLUMNS} FROM users ORDER BY id LIMIT $1 OFFSET $2");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(to_db_count(limit))
            .bind(to_db_count(skip))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_read_err(&e))?;
        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn update(&self, update: &UserUpdate) -> Result<User, DomainError> {
        // COALESCE keeps the stored value for every absent field, matching
        // the partial-update wire contract.
        let sql = format!(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                email = COALESCE($3, email), \
                password = COALESCE($4, password), \
                role = COALESCE($5, role), \
                updated_at = now() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(to_db_id(update.id)?)
            .bind(update.name.as_deref())
            .bind(update.email.as_deref())
            .bind(update.password.as_deref())
            .bind(update.role.map(UserRole::as_str))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_err(&e))?;
        row.ok_or(DomainError::DataNotFound)?.into_user()
    }

    async fn delete(&self, id: u64) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(to_db_id(id)?)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_err(&e))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_conversion_parses_role_and_id() {
        let row = UserRow {
            id: 3,
            name: "Ada".to_string(),
            email: "a@b.com".to_string(),
            password: "hash".to_string(),
            role: "admin".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let user = row.into_user().unwrap();
        assert_eq!(user.id, 3);
        assert_eq!(user.role, UserRole::Admin);
    }

    #[test]
    fn row_with_foreign_role_is_internal() {
        let row = UserRow {
            id: 3,
            name: "Ada".to_string(),
            email: "a@b.com".to_string(),
            password: "hash".to_string(),
            role: "superuser".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(row.into_user().unwrap_err(), DomainError::Internal);
    }

    #[test]
    fn ids_beyond_bigint_cannot_exist() {
        // Such an id cannot have been produced by this store, so lookups
        // short-circuit to not-found instead of hitting the database.
        assert_eq!(to_db_id(u64::MAX).unwrap_err(), DomainError::DataNotFound);
        assert_eq!(to_db_id(1).unwrap(), 1);
    }
}
