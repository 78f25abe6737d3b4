//! Authenticated account resolution for protected handlers.

use axum::http::HeaderMap;

use super::{session::extract_access_token, state::AuthState};
use crate::{error::Error, session::AccountView};

/// Resolve the access token (cookie or bearer) into the current account.
///
/// # Errors
/// `Unauthorized` when the token is missing, invalid or expired.
pub async fn require_auth(headers: &HeaderMap, auth_state: &AuthState) -> Result<AccountView, Error> {
    let token = extract_access_token(headers)
        .ok_or_else(|| Error::unauthorized("Access denied. Please log in"))?;
    auth_state.sessions().authenticate(&token).await
}

/// Like [`require_auth`], but anonymous or invalid callers resolve to `None`.
pub async fn optional_auth(headers: &HeaderMap, auth_state: &AuthState) -> Option<AccountView> {
    let token = extract_access_token(headers)?;
    auth_state.sessions().authenticate(&token).await.ok()
}
