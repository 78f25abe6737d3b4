//! Authenticated profile endpoints under `/users`.

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::JsonRejection,
        Extension,
    },
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::{
    auth::{principal::require_auth, AuthState},
    json_error, FormData,
};
use crate::{
    api::error::{ApiResponse, ErrorBody},
    error::Error,
    session::{AccountView, ChangePasswordInput, DetailsInput},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetailsRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct AvatarForm {
    #[schema(value_type = String, format = Binary)]
    pub avatar: Vec<u8>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct CoverImageForm {
    #[schema(value_type = String, format = Binary)]
    pub cover_image: Vec<u8>,
}

#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Current account", body = ApiResponse<AccountView>),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn get_me(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, Error> {
    let account = require_auth(&headers, &auth_state).await?;
    Ok(ApiResponse::ok(account, "User fetched successfully"))
}

#[utoipa::path(
    patch,
    path = "/users/details",
    request_body = DetailsRequest,
    responses(
        (status = 200, description = "Details updated", body = ApiResponse<AccountView>),
        (status = 400, description = "Missing fields or invalid email", body = ErrorBody),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody),
        (status = 409, description = "Email belongs to another account", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn update_details(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<DetailsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let account = require_auth(&headers, &auth_state).await?;
    let Json(request) = payload.map_err(|err| json_error(&err))?;

    let updated = auth_state
        .sessions()
        .update_details(
            account.id,
            DetailsInput {
                full_name: request.full_name,
                email: request.email,
            },
        )
        .await?;
    Ok(ApiResponse::ok(updated, "Account details updated successfully"))
}

#[utoipa::path(
    post,
    path = "/users/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<AccountView>),
        (status = 400, description = "Wrong old password or confirmation mismatch", body = ErrorBody),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn change_password(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let account = require_auth(&headers, &auth_state).await?;
    let Json(request) = payload.map_err(|err| json_error(&err))?;

    let account = auth_state
        .sessions()
        .change_password(
            account.id,
            ChangePasswordInput {
                old_password: request.old_password,
                new_password: request.new_password,
                confirm_password: request.confirm_password,
            },
        )
        .await?;
    Ok(ApiResponse::ok(account, "Password changed successfully"))
}

#[utoipa::path(
    patch,
    path = "/users/avatar",
    request_body(content = AvatarForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Avatar replaced", body = ApiResponse<AccountView>),
        (status = 400, description = "No avatar file", body = ErrorBody),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody),
        (status = 500, description = "Upload failed", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn update_avatar(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, Error> {
    let account = require_auth(&headers, &auth_state).await?;
    let mut form = FormData::read(multipart).await?;

    let updated = auth_state
        .sessions()
        .update_avatar(account.id, form.take_file("avatar"))
        .await?;
    Ok(ApiResponse::ok(updated, "Avatar image updated successfully"))
}

#[utoipa::path(
    patch,
    path = "/users/cover-image",
    request_body(content = CoverImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Cover image replaced", body = ApiResponse<AccountView>),
        (status = 400, description = "No cover image file", body = ErrorBody),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody),
        (status = 500, description = "Upload failed", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn update_cover_image(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, Error> {
    let account = require_auth(&headers, &auth_state).await?;
    let mut form = FormData::read(multipart).await?;

    let updated = auth_state
        .sessions()
        .update_cover_image(account.id, form.take_file("coverImage"))
        .await?;
    Ok(ApiResponse::ok(updated, "Cover image updated successfully"))
}
