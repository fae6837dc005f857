// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token issuance and verification (HS256 JWT).
//!
//! Tokens are stateless: nothing is stored server side, and a token stays
//! valid until its `exp` passes. There is no revocation list.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::{claims::TokenClaims, AuthError};
use crate::storage::StoredUser;

/// Default token lifetime (7 days).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Signs and verifies session tokens with a server-held secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service from a shared secret and token lifetime.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for a user, valid from now.
    pub fn generate_token(&self, user: &StoredUser) -> Result<String, AuthError> {
        self.generate_token_at(user, Utc::now().timestamp())
    }

    /// Issue a token as if issued at `issued_at` (Unix seconds).
    pub fn generate_token_at(&self, user: &StoredUser, issued_at: i64) -> Result<String, AuthError> {
        let ttl = i64::try_from(self.ttl.as_secs())
            .map_err(|_| AuthError::InternalError("token lifetime out of range".to_string()))?;

        let claims = TokenClaims {
            id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            iat: issued_at,
            exp: issued_at.saturating_add(ttl),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(format!("token signing failed: {e}")))
    }

    /// Verify a token and return its claims.
    ///
    /// Bad signature, malformed payload and expiry all collapse into
    /// `InvalidOrExpiredToken`.
    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(reason = ?e.kind(), "Rejected session token");
                AuthError::InvalidOrExpiredToken
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn service() -> TokenService {
        TokenService::new(b"test-secret", DEFAULT_TOKEN_TTL)
    }

    fn user() -> StoredUser {
        StoredUser {
            id: "5a0e2f64-8b5b-4f3b-9a41-0c1f0a6a7c11".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$2b$04$hash".to_string(),
            role: Role::Admin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn generated_token_verifies_and_carries_identity() {
        let service = service();
        let token = service.generate_token(&user()).unwrap();

        let claims = service.verify_token(&token).unwrap();
        assert_eq!(claims.id, user().id);
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn generation_is_deterministic_for_fixed_clock() {
        let service = service();
        let a = service.generate_token_at(&user(), 1_900_000_000).unwrap();
        let b = service.generate_token_at(&user(), 1_900_000_000).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = TokenService::new(b"test-secret", Duration::from_secs(60));
        let issued = Utc::now().timestamp() - 3600;
        let token = service.generate_token_at(&user(), issued).unwrap();

        assert_eq!(service.verify_token(&token), Err(AuthError::InvalidOrExpiredToken));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = TokenService::new(b"other-secret", DEFAULT_TOKEN_TTL);
        let token = other.generate_token(&user()).unwrap();

        assert_eq!(service().verify_token(&token), Err(AuthError::InvalidOrExpiredToken));
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(
            service().verify_token("not.a.jwt"),
            Err(AuthError::InvalidOrExpiredToken)
        );
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let service = service();
        let token = service.generate_token(&user()).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();

        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        let forged = URL_SAFE_NO_PAD.encode(
            r#"{"id":"someone-else","email":"x@example.com","role":"admin","iat":0,"exp":9999999999}"#,
        );
        parts[1] = &forged;

        assert_eq!(
            service.verify_token(&parts.join(".")),
            Err(AuthError::InvalidOrExpiredToken)
        );
    }
}
