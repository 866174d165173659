//! Authentication extractors.
//!
//! Tokens are read from the `access_token` cookie first, then from an
//! `Authorization: Bearer` header. The cookie is the path the browser
//! frontend uses; the header supports API clients.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use axum_extra::extract::CookieJar;

use crate::error::AppError;
use crate::models::User;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Extractor that requires an authenticated user.
///
/// Rejects with 401 when no valid token accompanies the request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts).ok_or(AppError::Auth(AuthError::NotAuthenticated))?;

        let auth = AuthService::new(state.pool(), &state.config().auth);
        let user = auth.current_user(&token).await?;

        Ok(Self(user))
    }
}

/// Extractor that resolves the current user if a valid token is present.
///
/// Never rejects; an absent or invalid token yields `None`. Used for guest
/// checkout, where orders may be placed without an account.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<User>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = token_from_parts(parts) else {
            return Ok(Self(None));
        };

        let auth = AuthService::new(state.pool(), &state.config().auth);
        Ok(Self(auth.current_user(&token).await.ok()))
    }
}

/// Pull an access token out of the request, cookie first.
fn token_from_parts(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        return Some(cookie.value().to_owned());
    }

    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with_headers(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_token_from_cookie() {
        let parts = parts_with_headers(&[("cookie", "access_token=tok123; theme=dark")]);
        assert_eq!(token_from_parts(&parts).as_deref(), Some("tok123"));
    }

    #[test]
    fn test_token_from_bearer_header() {
        let parts = parts_with_headers(&[("authorization", "Bearer tok456")]);
        assert_eq!(token_from_parts(&parts).as_deref(), Some("tok456"));
    }

    #[test]
    fn test_cookie_takes_precedence() {
        let parts = parts_with_headers(&[
            ("cookie", "access_token=from-cookie"),
            ("authorization", "Bearer from-header"),
        ]);
        assert_eq!(token_from_parts(&parts).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_no_token() {
        assert_eq!(token_from_parts(&parts_with_headers(&[])), None);

        // Malformed scheme is ignored
        let parts = parts_with_headers(&[("authorization", "Basic dXNlcg==")]);
        assert_eq!(token_from_parts(&parts), None);
    }
}
