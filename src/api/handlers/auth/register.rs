use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        Extension,
    },
    response::IntoResponse,
};
use std::sync::Arc;

use super::{state::AuthState, types::RegisterForm};
use crate::{
    api::{
        error::{ApiResponse, ErrorBody},
        handlers::FormData,
    },
    error::Error,
    session::{AccountView, RegisterInput},
};

#[utoipa::path(
    post,
    path = "/users/register",
    request_body(content = RegisterForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Account created", body = ApiResponse<AccountView>),
        (status = 400, description = "Missing fields, invalid email or no avatar", body = ErrorBody),
        (status = 409, description = "Username or email already registered", body = ErrorBody),
        (status = 500, description = "Avatar upload failed", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn register(
    auth_state: Extension<Arc<AuthState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, Error> {
    let mut form = FormData::read(multipart).await?;

    let input = RegisterInput {
        full_name: form.text("fullName"),
        email: form.text("email"),
        username: form.text("username"),
        password: form.text("password"),
        avatar: form.take_file("avatar"),
        cover_image: form.take_file("coverImage"),
    };

    let account = auth_state.sessions().register(input).await?;
    Ok(ApiResponse::created(account, "User registered successfully"))
}
