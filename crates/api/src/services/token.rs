//! Stateless session tokens.
//!
//! Tokens are HS256 JWTs carrying the caller's `{id, email, role}`. There is
//! no revocation list: expiry is the only way a token stops working.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use craftcart_core::Principal;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    principal: Principal,
    iat: i64,
    exp: i64,
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
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
    #[must_use]
    pub fn new(secret: &SecretString, ttl_hours: i64) -> Self {
        let key = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Sign a token for `principal`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Sign` if encoding fails.
    pub fn issue(&self, principal: &Principal) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            principal: principal.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Decode a token. Malformed, forged and expired tokens all yield `None`.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<Principal> {
        match decode::<Claims>(token, &self.decoding, &Validation::default()) {
            Ok(data) => Some(data.claims.principal),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected session token");
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use craftcart_core::{Role, UserId};

    use super::*;

    fn secret() -> SecretString {
        SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6")
    }

    fn principal() -> Principal {
        Principal {
            id: UserId::new(42),
            email: "maria@example.com".to_string(),
            role: Role::Artisan,
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = TokenService::new(&secret(), 24);
        let token = tokens.issue(&principal()).unwrap();
        assert_eq!(tokens.verify(&token), Some(principal()));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = TokenService::new(&secret(), -2);
        let token = tokens.issue(&principal()).unwrap();
        assert_eq!(tokens.verify(&token), None);
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let other = TokenService::new(&SecretString::from("zZ9#yY8$xX7%wW6^vV5&uU4*tT3(sS2"), 24);
        let token = other.issue(&principal()).unwrap();
        assert_eq!(TokenService::new(&secret(), 24).verify(&token), None);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let tokens = TokenService::new(&secret(), 24);
        assert_eq!(tokens.verify(""), None);
        assert_eq!(tokens.verify("not.a.token"), None);
    }
}
