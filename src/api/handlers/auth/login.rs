use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::{
    session::session_cookies,
    state::AuthState,
    types::{LoginRequest, LoginResponse},
};
use crate::{
    api::{
        error::{ApiResponse, ErrorBody},
        handlers::json_error,
    },
    error::Error,
    session::LoginInput,
};

#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; accessToken and refreshToken cookies set", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Neither username nor email supplied", body = ErrorBody),
        (status = 401, description = "Wrong password", body = ErrorBody),
        (status = 404, description = "No such account", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let Json(request) = payload.map_err(|err| json_error(&err))?;

    let (user, pair) = auth_state
        .sessions()
        .login(LoginInput {
            username: request.username,
            email: request.email,
            password: request.password,
        })
        .await?;

    let cookies = session_cookies(&auth_state, &pair)?;
    Ok((
        cookies,
        ApiResponse::ok(LoginResponse::new(user, pair), "User logged in successfully"),
    ))
}
