//! Bearer token authentication.
//!
//! Resolves the request's principal from an `Authorization: Bearer <token>`
//! header. A missing, malformed, expired or foreign token yields no
//! principal rather than an error; the policy table decides what an
//! anonymous caller may do.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};

use craftcart_core::Principal;

use crate::error::set_sentry_user;
use crate::services::TokenService;
use crate::state::AppState;

/// Extractor for the optional caller principal.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Session(principal): Session) -> impl IntoResponse {
///     match principal {
///         Some(p) => format!("Hello, {}!", p.email),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct Session(pub Option<Principal>);

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = principal_from_headers(&parts.headers, state.tokens());

        if let Some(principal) = &principal {
            set_sentry_user(&principal.id, Some(&principal.email));
        }

        Ok(Self(principal))
    }
}

/// Decode the bearer token in `headers`, if any.
#[must_use]
pub fn principal_from_headers(headers: &HeaderMap, tokens: &TokenService) -> Option<Principal> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = bearer_token(value)?;
    tokens.verify(token)
}

fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;
    use secrecy::SecretString;

    use craftcart_core::{Role, UserId};

    use super::*;

    fn tokens() -> TokenService {
        TokenService::new(
            &SecretString::from("k7Qm2vX9pL4wR8nT3jH6sB1cF5gD0zYa"),
            24,
        )
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer   abc "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer  "), None);
    }

    #[test]
    fn test_principal_from_valid_token() {
        let tokens = tokens();
        let principal = Principal {
            id: UserId::new(4),
            email: "ada@craftcart.test".to_string(),
            role: Role::Artisan,
        };
        let token = tokens.issue(&principal).unwrap();

        let resolved = principal_from_headers(&headers(&format!("Bearer {token}")), &tokens);
        assert_eq!(resolved, Some(principal));
    }

    #[test]
    fn test_missing_or_bad_token_is_anonymous() {
        let tokens = tokens();
        assert!(principal_from_headers(&HeaderMap::new(), &tokens).is_none());
        assert!(principal_from_headers(&headers("Bearer not.a.token"), &tokens).is_none());
    }
}
