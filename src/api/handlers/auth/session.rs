//! Session endpoints and cookie/bearer token transport.

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::error;

use super::{
    principal::require_auth,
    state::{AuthConfig, AuthState},
    types::RefreshRequest,
};
use crate::{
    api::error::{ApiResponse, ErrorBody},
    error::Error,
    session::{TokenKind, TokenPair},
};

pub(crate) const ACCESS_COOKIE_NAME: &str = "accessToken";
pub(crate) const REFRESH_COOKIE_NAME: &str = "refreshToken";

#[utoipa::path(
    post,
    path = "/users/logout",
    responses(
        (status = 200, description = "Refresh token cleared and cookies expired"),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn logout(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, Error> {
    let account = require_auth(&headers, &auth_state).await?;
    auth_state.sessions().logout(account.id).await?;

    Ok((
        cleared_cookies(auth_state.config()),
        ApiResponse::ok(Value::Object(Map::new()), "User logged out"),
    ))
}

#[utoipa::path(
    post,
    path = "/users/refresh-token",
    request_body(content = RefreshRequest, description = "Optional when the refreshToken cookie is sent"),
    responses(
        (status = 200, description = "Tokens rotated", body = ApiResponse<TokenPair>),
        (status = 401, description = "Missing, invalid, expired or superseded refresh token", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn refresh_token(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    body: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse, Error> {
    // Cookie wins over the body, matching how browsers send it.
    let presented = extract_cookie(&headers, REFRESH_COOKIE_NAME)
        .or_else(|| body.and_then(|Json(body)| body.refresh_token));

    let pair = auth_state.sessions().refresh(presented.as_deref()).await?;
    let cookies = session_cookies(&auth_state, &pair)?;

    Ok((cookies, ApiResponse::ok(pair, "Access token refreshed")))
}

fn cookie(name: &str, value: &str, max_age: i64, secure: bool) -> String {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build both `HttpOnly` session cookies for a freshly issued pair.
pub(super) fn session_cookies(auth_state: &AuthState, pair: &TokenPair) -> Result<HeaderMap, Error> {
    let secure = auth_state.config().cookie_secure();
    let mut headers = HeaderMap::new();
    for (name, value, kind) in [
        (ACCESS_COOKIE_NAME, &pair.access_token, TokenKind::Access),
        (REFRESH_COOKIE_NAME, &pair.refresh_token, TokenKind::Refresh),
    ] {
        let cookie = cookie(name, value, auth_state.cookie_max_age(kind), secure);
        let value = HeaderValue::from_str(&cookie).map_err(|err| {
            error!("Failed to build {name} cookie: {err}");
            Error::fatal("invalid session cookie")
        })?;
        headers.append(SET_COOKIE, value);
    }
    Ok(headers)
}

fn cleared_cookies(config: &AuthConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in [ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME] {
        if let Ok(value) = HeaderValue::from_str(&cookie(name, "", 0, config.cookie_secure())) {
            headers.append(SET_COOKIE, value);
        }
    }
    headers
}

pub(crate) fn extract_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next()?.trim();
            let val = parts.next()?.trim();
            (key == cookie_name && !val.is_empty()).then(|| val.to_string())
        })
        .next()
}

pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Access token from the `accessToken` cookie, falling back to `Authorization: Bearer`.
pub(crate) fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    extract_cookie(headers, ACCESS_COOKIE_NAME).or_else(|| extract_bearer_token(headers))
}
