//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the user's id, email and role.

use std::time::Duration;

use anyhow::{Context, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::models::User;

/// JWT issuer claim value.
const ISSUER: &str = "atelier";

/// JWT token claims.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TokenClaims {
    /// Issuer.
    pub iss: String,
    /// Subject (user ID).
    pub sub: String,
    pub email: String,
    pub role: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// JWT ID (unique per token).
    pub jti: String,
}

/// Signs and verifies bearer tokens.
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_lifetime: Duration,
}

impl AuthService {
    /// Create a new auth service with HMAC-SHA256 signing.
    pub fn new(jwt_secret: &[u8], token_lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret),
            decoding_key: DecodingKey::from_secret(jwt_secret),
            token_lifetime,
        }
    }

    /// Token lifetime in seconds.
    pub fn token_lifetime_secs(&self) -> i64 {
        i64::try_from(self.token_lifetime.as_secs()).unwrap_or(i64::MAX)
    }

    /// Issue a signed token for `user`.
    pub fn issue_token(&self, user: &User) -> Result<String> {
        let now = chrono::Utc::now().timestamp();

        let claims = TokenClaims {
            iss: ISSUER.to_string(),
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.clone(),
            iat: now,
            exp: now.saturating_add(self.token_lifetime_secs()),
            jti: Uuid::now_v7().to_string(),
        };

        let header = Header::new(Algorithm::HS256);
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).context("failed to encode token")
    }

    /// Verify a token's signature, issuer and expiry and return its claims.
    pub fn verify_token(&self, token: &str) -> Result<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.validate_aud = false;

        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .context("invalid token")?;

        Ok(data.claims)
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("token_lifetime", &self.token_lifetime)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::{CreateUser, ROLE_USER};

    const SECRET: &[u8] = b"test-secret-that-is-at-least-32-bytes-long";

    fn user() -> User {
        User::build(CreateUser {
            email: "editor@example.com".to_string(),
            password: "password123".to_string(),
            role: ROLE_USER.to_string(),
        })
        .unwrap()
    }

    #[test]
    fn issued_token_round_trips() {
        let auth = AuthService::new(SECRET, Duration::from_secs(3600));
        let user = user();

        let token = auth.issue_token(&user).unwrap();
        let claims = auth.verify_token(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "editor@example.com");
        assert_eq!(claims.role, "user");
        assert_eq!(claims.iss, "atelier");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = AuthService::new(
            b"another-secret-that-is-also-32-bytes-long",
            Duration::from_secs(60),
        );
        let verifier = AuthService::new(SECRET, Duration::from_secs(60));

        let token = issuer.issue_token(&user()).unwrap();
        assert!(verifier.verify_token(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let auth = AuthService::new(SECRET, Duration::from_secs(60));
        assert!(auth.verify_token("not.a.jwt").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = AuthService::new(SECRET, Duration::from_secs(60));
        let now = chrono::Utc::now().timestamp();
        let claims = TokenClaims {
            iss: ISSUER.to_string(),
            sub: Uuid::now_v7().to_string(),
            email: "old@example.com".to_string(),
            role: "user".to_string(),
            iat: now - 7200,
            exp: now - 3600,
            jti: Uuid::now_v7().to_string(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(auth.verify_token(&token).is_err());
    }
}
