//! Video publishing, listing and playlists.

use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::models::{NewPlaylist, NewVideo, Playlist, Video, VideoPage};
use crate::{
    error::{Error, Result},
    media::{MediaFile, MediaHost},
    session::utils::is_blank,
    store::{PlaylistStore, VideoStore},
};

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 50;

const MSG_VIDEO_MISSING: &str = "Video not found";
const MSG_PLAYLIST_MISSING: &str = "Playlist not found";

#[derive(Debug)]
pub struct PublishVideoInput {
    pub title: String,
    pub description: String,
    pub video_file: Option<MediaFile>,
    pub thumbnail: Option<MediaFile>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ListVideosQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub owner: Option<Uuid>,
}

impl ListVideosQuery {
    /// Page is 1-based; limit is clamped to `1..=MAX_PAGE_LIMIT`.
    fn normalized(self) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        (page, limit)
    }
}

pub struct CatalogService {
    videos: Arc<dyn VideoStore>,
    playlists: Arc<dyn PlaylistStore>,
    media: Arc<dyn MediaHost>,
}

impl CatalogService {
    #[must_use]
    pub fn new(
        videos: Arc<dyn VideoStore>,
        playlists: Arc<dyn PlaylistStore>,
        media: Arc<dyn MediaHost>,
    ) -> Self {
        Self {
            videos,
            playlists,
            media,
        }
    }

    /// Upload the video file and thumbnail, then store the video as published.
    ///
    /// # Errors
    /// `Validation` for blank text or missing files, `Dependency` when an upload fails.
    pub async fn publish_video(&self, owner: Uuid, input: PublishVideoInput) -> Result<Video> {
        if is_blank(&input.title) || is_blank(&input.description) {
            return Err(Error::validation("Title and description are required"));
        }
        let (Some(video_file), Some(thumbnail)) = (input.video_file, input.thumbnail) else {
            return Err(Error::validation("Video file and thumbnail are required"));
        };

        let video_file = self.media.upload(video_file).await.map_err(|err| {
            warn!(%owner, "Video upload failed: {err}");
            Error::dependency("Error while uploading video")
        })?;
        let thumbnail = self.media.upload(thumbnail).await.map_err(|err| {
            warn!(%owner, "Thumbnail upload failed: {err}");
            Error::dependency("Error while uploading thumbnail")
        })?;

        let video = self
            .videos
            .insert_video(NewVideo {
                video_file: video_file.url,
                thumbnail: thumbnail.url,
                owner,
                title: input.title.trim().to_string(),
                description: input.description.trim().to_string(),
                duration: video_file.duration.unwrap_or_default(),
            })
            .await?;

        debug!(video_id = %video.id, %owner, "Published video");
        Ok(video)
    }

    /// # Errors
    /// Returns an error if the store fails.
    pub async fn list_videos(&self, query: ListVideosQuery) -> Result<VideoPage> {
        let (page, limit) = query.normalized();
        let offset = u64::from(page - 1) * u64::from(limit);
        let (docs, total_docs) = self
            .videos
            .list_published(query.owner, offset, limit)
            .await?;
        let total_pages = u32::try_from(total_docs.div_ceil(u64::from(limit))).unwrap_or(u32::MAX);

        Ok(VideoPage {
            docs,
            total_docs,
            page,
            limit,
            total_pages,
        })
    }

    /// Fetch a video and count the view. Unpublished videos are only visible
    /// to their owner.
    ///
    /// # Errors
    /// `NotFound` for unknown or hidden videos.
    pub async fn get_video(&self, id: Uuid, viewer: Option<Uuid>) -> Result<Video> {
        let video = self
            .videos
            .find_video(id)
            .await?
            .ok_or_else(|| Error::not_found(MSG_VIDEO_MISSING))?;

        if !video.is_published && viewer != Some(video.owner) {
            return Err(Error::not_found(MSG_VIDEO_MISSING));
        }

        self.videos
            .increment_views(id)
            .await?
            .ok_or_else(|| Error::not_found(MSG_VIDEO_MISSING))
    }

    /// # Errors
    /// `NotFound` for unknown videos or when `owner` does not own it.
    pub async fn toggle_publish(&self, id: Uuid, owner: Uuid) -> Result<Video> {
        let video = self.owned_video(id, owner).await?;
        let video = self
            .videos
            .set_published(id, !video.is_published)
            .await?
            .ok_or_else(|| Error::not_found(MSG_VIDEO_MISSING))?;
        debug!(video_id = %id, published = video.is_published, "Toggled publish status");
        Ok(video)
    }

    /// # Errors
    /// `Validation` for a blank name or description.
    pub async fn create_playlist(
        &self,
        owner: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Playlist> {
        if is_blank(name) || is_blank(description) {
            return Err(Error::validation("Name and description are required"));
        }
        let playlist = self
            .playlists
            .insert_playlist(NewPlaylist {
                name: name.trim().to_string(),
                description: description.trim().to_string(),
                owner,
            })
            .await?;
        debug!(playlist_id = %playlist.id, %owner, "Created playlist");
        Ok(playlist)
    }

    /// # Errors
    /// `NotFound` for unknown playlists.
    pub async fn get_playlist(&self, id: Uuid) -> Result<Playlist> {
        self.playlists
            .find_playlist(id)
            .await?
            .ok_or_else(|| Error::not_found(MSG_PLAYLIST_MISSING))
    }

    /// Append a video; adding one that is already present changes nothing.
    ///
    /// # Errors
    /// `NotFound` for an unknown video, or a playlist the caller does not own.
    pub async fn add_video(&self, playlist_id: Uuid, video_id: Uuid, owner: Uuid) -> Result<Playlist> {
        self.owned_playlist(playlist_id, owner).await?;
        if self.videos.find_video(video_id).await?.is_none() {
            return Err(Error::not_found(MSG_VIDEO_MISSING));
        }
        self.playlists
            .add_video(playlist_id, video_id)
            .await?
            .ok_or_else(|| Error::not_found(MSG_PLAYLIST_MISSING))
    }

    /// # Errors
    /// `NotFound` for a playlist the caller does not own.
    pub async fn remove_video(
        &self,
        playlist_id: Uuid,
        video_id: Uuid,
        owner: Uuid,
    ) -> Result<Playlist> {
        self.owned_playlist(playlist_id, owner).await?;
        self.playlists
            .remove_video(playlist_id, video_id)
            .await?
            .ok_or_else(|| Error::not_found(MSG_PLAYLIST_MISSING))
    }

    // Other owners get NotFound rather than a permission error.
    async fn owned_video(&self, id: Uuid, owner: Uuid) -> Result<Video> {
        self.videos
            .find_video(id)
            .await?
            .filter(|video| video.owner == owner)
            .ok_or_else(|| Error::not_found(MSG_VIDEO_MISSING))
    }

    async fn owned_playlist(&self, id: Uuid, owner: Uuid) -> Result<Playlist> {
        self.playlists
            .find_playlist(id)
            .await?
            .filter(|playlist| playlist.owner == owner)
            .ok_or_else(|| Error::not_found(MSG_PLAYLIST_MISSING))
    }
}
