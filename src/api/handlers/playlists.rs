//! Playlists owned by the authenticated account.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path,
    },
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    auth::{principal::require_auth, AuthState},
    json_error, path_error,
};
use crate::{
    api::error::{ApiResponse, ErrorBody},
    catalog::{CatalogService, Playlist},
    error::Error,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePlaylistRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[utoipa::path(
    post,
    path = "/playlists",
    request_body = CreatePlaylistRequest,
    responses(
        (status = 201, description = "Playlist created", body = ApiResponse<Playlist>),
        (status = 400, description = "Missing name or description", body = ErrorBody),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody)
    ),
    tag = "playlists"
)]
pub async fn create_playlist(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    catalog: Extension<Arc<CatalogService>>,
    payload: Result<Json<CreatePlaylistRequest>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let account = require_auth(&headers, &auth_state).await?;
    let Json(request) = payload.map_err(|err| json_error(&err))?;

    let playlist = catalog
        .create_playlist(account.id, &request.name, &request.description)
        .await?;
    Ok(ApiResponse::created(playlist, "Playlist created successfully"))
}

#[utoipa::path(
    get,
    path = "/playlists/{id}",
    params(("id" = Uuid, Path, description = "Playlist id")),
    responses(
        (status = 200, description = "Playlist", body = ApiResponse<Playlist>),
        (status = 404, description = "Unknown playlist", body = ErrorBody)
    ),
    tag = "playlists"
)]
pub async fn get_playlist(
    catalog: Extension<Arc<CatalogService>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, Error> {
    let Path(id) = id.map_err(|err| path_error(&err))?;
    let playlist = catalog.get_playlist(id).await?;
    Ok(ApiResponse::ok(playlist, "Playlist fetched successfully"))
}

#[utoipa::path(
    post,
    path = "/playlists/{id}/videos/{video_id}",
    params(
        ("id" = Uuid, Path, description = "Playlist id"),
        ("video_id" = Uuid, Path, description = "Video id")
    ),
    responses(
        (status = 200, description = "Video added (no-op when already present)", body = ApiResponse<Playlist>),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody),
        (status = 404, description = "Unknown playlist or video, or not the owner", body = ErrorBody)
    ),
    tag = "playlists"
)]
pub async fn add_video(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    catalog: Extension<Arc<CatalogService>>,
    ids: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<impl IntoResponse, Error> {
    let account = require_auth(&headers, &auth_state).await?;
    let Path((id, video_id)) = ids.map_err(|err| path_error(&err))?;

    let playlist = catalog.add_video(id, video_id, account.id).await?;
    Ok(ApiResponse::ok(playlist, "Video added to playlist"))
}

#[utoipa::path(
    delete,
    path = "/playlists/{id}/videos/{video_id}",
    params(
        ("id" = Uuid, Path, description = "Playlist id"),
        ("video_id" = Uuid, Path, description = "Video id")
    ),
    responses(
        (status = 200, description = "Video removed", body = ApiResponse<Playlist>),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody),
        (status = 404, description = "Unknown playlist or not the owner", body = ErrorBody)
    ),
    tag = "playlists"
)]
pub async fn remove_video(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    catalog: Extension<Arc<CatalogService>>,
    ids: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<impl IntoResponse, Error> {
    let account = require_auth(&headers, &auth_state).await?;
    let Path((id, video_id)) = ids.map_err(|err| path_error(&err))?;

    let playlist = catalog.remove_video(id, video_id, account.id).await?;
    Ok(ApiResponse::ok(playlist, "Video removed from playlist"))
}
