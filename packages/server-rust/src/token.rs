//! Sealed access tokens: versioned, encrypted, self-contained.
//!
//! A token is `v1.local.<base64url>` where the blob is a random 24-byte
//! nonce followed by the XChaCha20-Poly1305 ciphertext of the JSON claims.
//! The symmetric key is generated once at service construction and held
//! only in process memory: restarting the process invalidates every
//! outstanding token. Expiry is the only other invalidation path; there is
//! no revocation list.

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use roster_core::{DomainError, TokenPayload, User};

const VERSION_PREFIX: &str = "v1.local.";
const NONCE_LEN: usize = 24;

/// Claims sealed inside a token. Timestamps are unix seconds.
#[derive(Debug, Serialize, Deserialize)]
struct SealedClaims {
    jti: Uuid,
    uid: u64,
    role: roster_core::UserRole,
    iat: i64,
    nbf: i64,
    exp: i64,
}

/// Issues and verifies sealed access tokens.
///
/// The key is read-only after construction, so one instance is safely
/// shared by any number of concurrent callers without locking.
pub struct TokenService {
    key: Key,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a service with a fresh random key and the given token
    /// lifetime.
    #[must_use]
    pub fn new(lifetime: Duration) -> Self {
        Self {
            key: XChaCha20Poly1305::generate_key(&mut OsRng),
            lifetime,
        }
    }

    /// Issues a token binding the user's id and role, valid from now until
    /// now + lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::TokenCreation`] if sealing fails.
    pub fn issue(&self, user: &User) -> Result<String, DomainError> {
        let now = Utc::now().timestamp();
        let lifetime = i64::try_from(self.lifetime.as_secs()).unwrap_or(i64::MAX);
        let claims = SealedClaims {
            jti: Uuid::new_v4(),
            uid: user.id,
            role: user.role,
            iat: now,
            nbf: now,
            exp: now.saturating_add(lifetime),
        };

        let plaintext = serde_json::to_vec(&claims).map_err(|_| DomainError::TokenCreation)?;
        let cipher = XChaCha20Poly1305::new(&self.key);
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_slice())
            .map_err(|_| DomainError::TokenCreation)?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(nonce.as_slice());
        blob.extend_from_slice(&ciphertext);

        Ok(format!("{VERSION_PREFIX}{}", URL_SAFE_NO_PAD.encode(blob)))
    }

    /// Decrypts and validates a token, returning the embedded payload.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::ExpiredToken`] when the expiration has
    /// elapsed, and [`DomainError::InvalidToken`] for every other failure:
    /// wrong prefix, bad encoding, truncated blob, failed decryption, an
    /// undecodable payload, or a not-before instant still in the future.
    /// Callers rely on the distinction to tell "log in again" apart from
    /// "malformed or forged credential".
    pub fn verify(&self, token: &str) -> Result<TokenPayload, DomainError> {
        let encoded = token
            .strip_prefix(VERSION_PREFIX)
            .ok_or(DomainError::InvalidToken)?;
        let blob = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| DomainError::InvalidToken)?;
        if blob.len() <= NONCE_LEN {
            return Err(DomainError::InvalidToken);
        }
        let (nonce, ciphertext) = blob.split_at(NONCE_LEN);

        let cipher = XChaCha20Poly1305::new(&self.key);
        let plaintext = cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|_| DomainError::InvalidToken)?;
        let claims: SealedClaims =
            serde_json::from_slice(&plaintext).map_err(|_| DomainError::InvalidToken)?;

        let now = Utc::now().timestamp();
        if now < claims.nbf {
            return Err(DomainError::InvalidToken);
        }
        if now >= claims.exp {
            return Err(DomainError::ExpiredToken);
        }

        Ok(TokenPayload {
            id: claims.jti,
            user_id: claims.uid,
            role: claims.role,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use roster_core::UserRole;

    use super::*;

    fn sample_user(id: u64, role: UserRole) -> User {
        User {
            id,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: String::new(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn verify_returns_the_issued_identity() {
        let service = TokenService::new(Duration::from_secs(900));
        let token = service.issue(&sample_user(42, UserRole::Admin)).unwrap();

        let payload = service.verify(&token).unwrap();
        assert_eq!(payload.user_id, 42);
        assert_eq!(payload.role, UserRole::Admin);
    }

    #[test]
    fn token_ids_are_fresh_per_issuance() {
        let service = TokenService::new(Duration::from_secs(900));
        let user = sample_user(1, UserRole::Basic);
        let a = service.verify(&service.issue(&user).unwrap()).unwrap();
        let b = service.verify(&service.issue(&user).unwrap()).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn elapsed_expiry_is_expired_not_invalid() {
        // Zero lifetime makes exp == now, which has already elapsed.
        let service = TokenService::new(Duration::from_secs(0));
        let token = service.issue(&sample_user(1, UserRole::Basic)).unwrap();
        assert_eq!(
            service.verify(&token).unwrap_err(),
            DomainError::ExpiredToken
        );
    }

    #[test]
    fn foreign_key_tokens_are_invalid() {
        let issuer = TokenService::new(Duration::from_secs(900));
        let verifier = TokenService::new(Duration::from_secs(900));
        let token = issuer.issue(&sample_user(1, UserRole::Basic)).unwrap();
        assert_eq!(
            verifier.verify(&token).unwrap_err(),
            DomainError::InvalidToken
        );
    }

    #[test]
    fn tampered_tokens_are_invalid() {
        let service = TokenService::new(Duration::from_secs(900));
        let token = service.issue(&sample_user(1, UserRole::Basic)).unwrap();

        // Flip the final ciphertext character.
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });
        assert_eq!(
            service.verify(&tampered).unwrap_err(),
            DomainError::InvalidToken
        );
    }

    #[test]
    fn malformed_blobs_are_invalid() {
        let service = TokenService::new(Duration::from_secs(900));
        for token in [
            "",
            "v1.local.",
            "v1.local.%%%not-base64%%%",
            "v1.local.AAAA",
            "v2.local.AAAA",
            "not-a-token-at-all",
        ] {
            assert_eq!(
                service.verify(token).unwrap_err(),
                DomainError::InvalidToken,
                "token: {token:?}"
            );
        }
    }
}
