//! Video publishing and browsing.

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::{PathRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::HeaderMap,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{
    auth::{
        principal::{optional_auth, require_auth},
        AuthState,
    },
    path_error, query_error, FormData,
};
use crate::{
    api::error::{ApiResponse, ErrorBody},
    catalog::{CatalogService, ListVideosQuery, PublishVideoInput, Video, VideoPage},
    error::Error,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListVideosParams {
    /// 1-based page number (default 1).
    pub page: Option<u32>,
    /// Page size, clamped to 1..=50 (default 10).
    pub limit: Option<u32>,
    /// Only videos owned by this account.
    pub owner: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct PublishVideoForm {
    pub title: String,
    pub description: String,
    #[schema(value_type = String, format = Binary)]
    pub video_file: Vec<u8>,
    #[schema(value_type = String, format = Binary)]
    pub thumbnail: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/videos",
    request_body(content = PublishVideoForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Video published", body = ApiResponse<Video>),
        (status = 400, description = "Missing title, description or files", body = ErrorBody),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody),
        (status = 500, description = "Upload failed", body = ErrorBody)
    ),
    tag = "videos"
)]
pub async fn publish_video(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    catalog: Extension<Arc<CatalogService>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, Error> {
    let account = require_auth(&headers, &auth_state).await?;
    let mut form = FormData::read(multipart).await?;

    let video = catalog
        .publish_video(
            account.id,
            PublishVideoInput {
                title: form.text("title"),
                description: form.text("description"),
                video_file: form.take_file("videoFile"),
                thumbnail: form.take_file("thumbnail"),
            },
        )
        .await?;
    Ok(ApiResponse::created(video, "Video published successfully"))
}

#[utoipa::path(
    get,
    path = "/videos",
    params(ListVideosParams),
    responses(
        (status = 200, description = "Published videos, newest first", body = ApiResponse<VideoPage>),
        (status = 400, description = "Invalid query", body = ErrorBody)
    ),
    tag = "videos"
)]
pub async fn list_videos(
    catalog: Extension<Arc<CatalogService>>,
    params: Result<Query<ListVideosParams>, QueryRejection>,
) -> Result<impl IntoResponse, Error> {
    let Query(params) = params.map_err(|err| query_error(&err))?;
    let page = catalog
        .list_videos(ListVideosQuery {
            page: params.page,
            limit: params.limit,
            owner: params.owner,
        })
        .await?;
    Ok(ApiResponse::ok(page, "Videos fetched successfully"))
}

#[utoipa::path(
    get,
    path = "/videos/{id}",
    params(("id" = Uuid, Path, description = "Video id")),
    responses(
        (status = 200, description = "Video, with the view counted", body = ApiResponse<Video>),
        (status = 404, description = "Unknown video, or unpublished and not owned by the caller", body = ErrorBody)
    ),
    tag = "videos"
)]
pub async fn get_video(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    catalog: Extension<Arc<CatalogService>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, Error> {
    let Path(id) = id.map_err(|err| path_error(&err))?;
    let viewer = optional_auth(&headers, &auth_state)
        .await
        .map(|account| account.id);

    let video = catalog.get_video(id, viewer).await?;
    Ok(ApiResponse::ok(video, "Video fetched successfully"))
}

#[utoipa::path(
    patch,
    path = "/videos/{id}/toggle-publish",
    params(("id" = Uuid, Path, description = "Video id")),
    responses(
        (status = 200, description = "Publish status flipped", body = ApiResponse<Video>),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody),
        (status = 404, description = "Unknown video or not the owner", body = ErrorBody)
    ),
    tag = "videos"
)]
pub async fn toggle_publish(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    catalog: Extension<Arc<CatalogService>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, Error> {
    let account = require_auth(&headers, &auth_state).await?;
    let Path(id) = id.map_err(|err| path_error(&err))?;

    let video = catalog.toggle_publish(id, account.id).await?;
    Ok(ApiResponse::ok(video, "Publish status updated"))
}
