//! Domain value types shared by both transports.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

// ---------------------------------------------------------------------------
// UserRole
// ---------------------------------------------------------------------------

/// Access level attached to a user account.
///
/// Lowercase variant names match the wire and database representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Basic,
}

impl UserRole {
    /// Wire/database spelling of the role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Basic => "basic",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "basic" => Ok(Self::Basic),
            _ => Err(DomainError::Internal),
        }
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A registered user account.
///
/// `password` carries the argon2 hash, never cleartext, and is skipped on
/// serialization so wire payloads and cache entries never leak it. Values
/// deserialized from a cache therefore come back with an empty hash; every
/// credential check goes through the store instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a user.
///
/// `password` is cleartext here; the user service hashes it before the
/// value crosses the store boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// Partial update for an existing user. `None` fields keep their stored
/// value. `password` is cleartext in transport payloads and replaced with
/// the argon2 hash before reaching a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub id: u64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
}

// ---------------------------------------------------------------------------
// TokenPayload
// ---------------------------------------------------------------------------

/// Identity data embedded inside an issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Random identifier of the token itself, fresh per issuance.
    pub id: Uuid,
    /// Id of the user the token was issued to.
    pub user_id: u64,
    /// Role captured at issuance time.
    pub role: UserRole,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("basic".parse::<UserRole>().unwrap(), UserRole::Basic);
        assert_eq!(UserRole::Admin.to_string(), "admin");
        assert_eq!(UserRole::Basic.to_string(), "basic");
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("root".parse::<UserRole>().is_err());
        assert!("".parse::<UserRole>().is_err());
    }

    #[test]
    fn serialized_user_omits_password_hash() {
        let user = User {
            id: 7,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "$argon2id$v=19$...".to_string(),
            role: UserRole::Basic,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn user_deserializes_without_password_field() {
        let json = r#"{
            "id": 1,
            "name": "Ada",
            "email": "ada@example.com",
            "role": "admin",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert!(user.password.is_empty());
    }
}
