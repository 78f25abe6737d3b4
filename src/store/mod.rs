//! Persistence seams for accounts and the video catalog.
//!
//! Services only see the traits below. `PgStore` is the production backend;
//! tests use the in-memory store.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    catalog::models::{NewPlaylist, NewVideo, Playlist, Video},
    session::models::{Account, NewAccount},
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint (username or email) rejected the write.
    #[error("unique constraint violated")]
    Conflict,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    /// Match on username or email, whichever is provided. Both `None` returns `None`.
    async fn find_account_by_identity(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<Account>, StoreError>;

    async fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Overwrite the stored refresh token. Returns `false` when the account does not exist.
    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<bool, StoreError>;

    /// Replace the refresh token only while it still equals `presented`.
    /// Returns `false` when the account is gone or the token already moved on.
    async fn rotate_refresh_token(
        &self,
        id: Uuid,
        presented: &str,
        next: &str,
    ) -> Result<bool, StoreError>;

    async fn update_details(
        &self,
        id: Uuid,
        full_name: &str,
        email: &str,
    ) -> Result<Option<Account>, StoreError>;

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<Account>, StoreError>;

    async fn update_avatar(&self, id: Uuid, url: &str) -> Result<Option<Account>, StoreError>;

    async fn update_cover_image(&self, id: Uuid, url: &str)
        -> Result<Option<Account>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn insert_video(&self, video: NewVideo) -> Result<Video, StoreError>;

    async fn find_video(&self, id: Uuid) -> Result<Option<Video>, StoreError>;

    async fn increment_views(&self, id: Uuid) -> Result<Option<Video>, StoreError>;

    /// Published videos, newest first, with the total count of matching rows.
    async fn list_published(
        &self,
        owner: Option<Uuid>,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<Video>, u64), StoreError>;

    async fn set_published(&self, id: Uuid, published: bool)
        -> Result<Option<Video>, StoreError>;
}

#[async_trait]
pub trait PlaylistStore: Send + Sync {
    async fn insert_playlist(&self, playlist: NewPlaylist) -> Result<Playlist, StoreError>;

    async fn find_playlist(&self, id: Uuid) -> Result<Option<Playlist>, StoreError>;

    /// Append a video unless it is already part of the playlist.
    async fn add_video(&self, id: Uuid, video_id: Uuid) -> Result<Option<Playlist>, StoreError>;

    async fn remove_video(&self, id: Uuid, video_id: Uuid)
        -> Result<Option<Playlist>, StoreError>;
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}
