//! Authentication route handlers.
//!
//! Login issues a signed token delivered in an `HttpOnly` cookie and
//! returns the user record; subsequent requests authenticate with the
//! cookie or an `Authorization: Bearer` header.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::Deserialize;
use serde_json::json;

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::middleware::auth::ACCESS_TOKEN_COOKIE;
use crate::services::auth::{AuthService, decode_token};
use crate::state::AppState;

/// Credentials for registration and login.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Register a new account.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool(), &state.config().auth);
    let user = auth.register(&body.email, &body.password).await?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login, setting the access token cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<Credentials>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool(), &state.config().auth);
    let (user, token) = auth.login(&body.email, &body.password).await?;

    tracing::info!(user_id = %user.id, "user logged in");

    let cookie = Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(1))
        .path("/")
        .build();

    // Flat user body; the token travels only in the cookie
    Ok((jar.add(cookie), Json(user)))
}

/// Logout by clearing the access token cookie.
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    // Path must match the login cookie or removal is ignored
    let cookie = Cookie::build((ACCESS_TOKEN_COOKIE, "")).path("/").build();

    (
        jar.remove(cookie),
        Json(json!({ "detail": "Logged out successfully" })),
    )
}

/// The currently authenticated user.
pub async fn me(CurrentUser(user): CurrentUser) -> Json<serde_json::Value> {
    Json(json!({ "email": user.email }))
}

/// Cookie-only session probe.
///
/// Unlike `me`, this never rejects: a missing or invalid cookie yields
/// `{"email": null}`. Bearer headers are deliberately ignored; the endpoint
/// exists for the browser frontend to test its cookie session.
pub async fn check(State(state): State<AppState>, jar: CookieJar) -> Json<serde_json::Value> {
    let email = jar
        .get(ACCESS_TOKEN_COOKIE)
        .and_then(|cookie| decode_token(cookie.value(), &state.config().auth).ok())
        .map(|claims| claims.sub);

    Json(json!({ "email": email }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::header;

    use super::*;

    #[tokio::test]
    async fn test_logout_clears_cookie_and_uses_detail_body() {
        let response = logout(CookieJar::new()).await.into_response();

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_owned();
        assert!(set_cookie.starts_with("access_token="));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body.get("detail").is_some());
        assert!(body.get("message").is_none());
    }
}
