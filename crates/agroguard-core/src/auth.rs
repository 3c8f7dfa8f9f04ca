//! Credential service: password hashing and signed session tokens.
//!
//! Passwords are hashed with Argon2id into PHC strings. Session tokens are
//! HS256 JWTs carrying the account id, email, and expiry; validity is purely
//! a function of signature and embedded expiry, so a token cannot be revoked
//! before it naturally expires.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by credential operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Hashing or verifying a password failed (not a mismatch).
    #[error("password hash error: {0}")]
    Hash(String),
    /// Encoding a session token failed.
    #[error("token encoding error: {0}")]
    TokenEncode(String),
    /// The token is expired, malformed, or tampered with. Callers cannot
    /// distinguish the three cases.
    #[error("invalid or expired token")]
    InvalidToken,
}

/// Hash a password into a salted PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AuthError::Hash(err.to_string()))?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string.
///
/// A mismatch is `Ok(false)`; only a malformed stored hash is an error.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored).map_err(|err| AuthError::Hash(err.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(AuthError::Hash(err.to_string())),
    }
}

/// Claims embedded in a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Owning account id.
    pub sub: i64,
    /// Account email at issuance time.
    pub email: String,
    /// Expiry as unix seconds.
    pub exp: i64,
}

/// Issues and verifies signed, time-limited session tokens.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer over a shared secret with a fixed token lifetime.
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issue a token for an account, expiring `ttl` from now.
    pub fn issue(&self, account_id: i64, email: &str) -> Result<String, AuthError> {
        let claims = TokenClaims {
            sub: account_id,
            email: email.to_string(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| AuthError::TokenEncode(err.to_string()))
    }

    /// Return the embedded claims if the signature is valid and unexpired.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        decode::<TokenClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::{TokenIssuer, hash_password, verify_password};
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("p1").expect("hash");
        assert!(verify_password("p1", &hash).expect("verify"));
        assert!(!verify_password("p2", &hash).expect("verify"));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("p1").expect("hash");
        let second = hash_password("p1").expect("hash");
        assert!(first != second);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("p1", "not-a-phc-string").is_err());
    }

    #[test]
    fn token_round_trip() {
        let issuer = TokenIssuer::new("secret", Duration::hours(24));
        let token = issuer.issue(7, "a@x.com").expect("issue");
        let claims = issuer.verify(&token).expect("verify");
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "a@x.com");
    }

    #[test]
    fn expired_token_is_invalid() {
        let issuer = TokenIssuer::new("secret", Duration::seconds(-120));
        let token = issuer.issue(7, "a@x.com").expect("issue");
        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn tampered_token_is_invalid() {
        let issuer = TokenIssuer::new("secret", Duration::hours(24));
        let other = TokenIssuer::new("other-secret", Duration::hours(24));
        let token = other.issue(7, "a@x.com").expect("issue");
        assert!(issuer.verify(&token).is_err());
        assert!(issuer.verify("not.a.token").is_err());
    }
}
