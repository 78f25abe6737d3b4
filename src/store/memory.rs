//! In-memory store used by service and handler tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{AccountStore, PlaylistStore, StoreError, VideoStore};
use crate::{
    catalog::models::{NewPlaylist, NewVideo, Playlist, Video},
    session::models::{Account, NewAccount},
};

#[derive(Default)]
pub struct MemoryStore {
    accounts: Mutex<HashMap<Uuid, Account>>,
    videos: Mutex<HashMap<Uuid, Video>>,
    playlists: Mutex<HashMap<Uuid, Playlist>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn account_count(&self) -> usize {
        self.accounts.lock().await.len()
    }

    pub async fn stored_refresh_token(&self, id: Uuid) -> Option<String> {
        self.accounts
            .lock()
            .await
            .get(&id)
            .and_then(|account| account.refresh_token.clone())
    }
}

fn update_account<F>(accounts: &mut HashMap<Uuid, Account>, id: Uuid, apply: F) -> Option<Account>
where
    F: FnOnce(&mut Account),
{
    let account = accounts.get_mut(&id)?;
    apply(account);
    account.updated_at = Utc::now();
    Some(account.clone())
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.lock().await.get(&id).cloned())
    }

    async fn find_account_by_identity(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().await;
        Ok(accounts
            .values()
            .find(|account| {
                username.is_some_and(|username| account.username == username)
                    || email.is_some_and(|email| account.email == email)
            })
            .cloned())
    }

    async fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.lock().await;
        if accounts
            .values()
            .any(|row| row.username == account.username || row.email == account.email)
        {
            return Err(StoreError::Conflict);
        }
        let now = Utc::now();
        let row = Account {
            id: Uuid::now_v7(),
            username: account.username,
            email: account.email,
            full_name: account.full_name,
            avatar: account.avatar,
            cover_image: account.cover_image,
            password_hash: account.password_hash,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(row.id, row.clone());
        Ok(row)
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<bool, StoreError> {
        let mut accounts = self.accounts.lock().await;
        Ok(update_account(&mut accounts, id, |account| {
            account.refresh_token = token.map(str::to_string);
        })
        .is_some())
    }

    async fn rotate_refresh_token(
        &self,
        id: Uuid,
        presented: &str,
        next: &str,
    ) -> Result<bool, StoreError> {
        let mut accounts = self.accounts.lock().await;
        let current = accounts
            .get(&id)
            .and_then(|account| account.refresh_token.as_deref());
        if current != Some(presented) {
            return Ok(false);
        }
        Ok(update_account(&mut accounts, id, |account| {
            account.refresh_token = Some(next.to_string());
        })
        .is_some())
    }

    async fn update_details(
        &self,
        id: Uuid,
        full_name: &str,
        email: &str,
    ) -> Result<Option<Account>, StoreError> {
        let mut accounts = self.accounts.lock().await;
        if accounts
            .values()
            .any(|row| row.id != id && row.email == email)
        {
            return Err(StoreError::Conflict);
        }
        Ok(update_account(&mut accounts, id, |account| {
            account.full_name = full_name.to_string();
            account.email = email.to_string();
        }))
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<Account>, StoreError> {
        let mut accounts = self.accounts.lock().await;
        Ok(update_account(&mut accounts, id, |account| {
            account.password_hash = password_hash.to_string();
        }))
    }

    async fn update_avatar(&self, id: Uuid, url: &str) -> Result<Option<Account>, StoreError> {
        let mut accounts = self.accounts.lock().await;
        Ok(update_account(&mut accounts, id, |account| {
            account.avatar = url.to_string();
        }))
    }

    async fn update_cover_image(
        &self,
        id: Uuid,
        url: &str,
    ) -> Result<Option<Account>, StoreError> {
        let mut accounts = self.accounts.lock().await;
        Ok(update_account(&mut accounts, id, |account| {
            account.cover_image = url.to_string();
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl VideoStore for MemoryStore {
    async fn insert_video(&self, video: NewVideo) -> Result<Video, StoreError> {
        let now = Utc::now();
        let row = Video {
            id: Uuid::now_v7(),
            video_file: video.video_file,
            thumbnail: video.thumbnail,
            owner: video.owner,
            title: video.title,
            description: video.description,
            duration: video.duration,
            views: 0,
            is_published: true,
            created_at: now,
            updated_at: now,
        };
        self.videos.lock().await.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_video(&self, id: Uuid) -> Result<Option<Video>, StoreError> {
        Ok(self.videos.lock().await.get(&id).cloned())
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<Video>, StoreError> {
        let mut videos = self.videos.lock().await;
        Ok(videos.get_mut(&id).map(|video| {
            video.views += 1;
            video.clone()
        }))
    }

    async fn list_published(
        &self,
        owner: Option<Uuid>,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<Video>, u64), StoreError> {
        let videos = self.videos.lock().await;
        let mut matching: Vec<Video> = videos
            .values()
            .filter(|video| video.is_published)
            .filter(|video| owner.is_none_or(|owner| video.owner == owner))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn set_published(
        &self,
        id: Uuid,
        published: bool,
    ) -> Result<Option<Video>, StoreError> {
        let mut videos = self.videos.lock().await;
        Ok(videos.get_mut(&id).map(|video| {
            video.is_published = published;
            video.updated_at = Utc::now();
            video.clone()
        }))
    }
}

#[async_trait]
impl PlaylistStore for MemoryStore {
    async fn insert_playlist(&self, playlist: NewPlaylist) -> Result<Playlist, StoreError> {
        let now = Utc::now();
        let row = Playlist {
            id: Uuid::now_v7(),
            name: playlist.name,
            description: playlist.description,
            owner: playlist.owner,
            videos: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.playlists.lock().await.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_playlist(&self, id: Uuid) -> Result<Option<Playlist>, StoreError> {
        Ok(self.playlists.lock().await.get(&id).cloned())
    }

    async fn add_video(&self, id: Uuid, video_id: Uuid) -> Result<Option<Playlist>, StoreError> {
        let mut playlists = self.playlists.lock().await;
        Ok(playlists.get_mut(&id).map(|playlist| {
            if !playlist.videos.contains(&video_id) {
                playlist.videos.push(video_id);
            }
            playlist.updated_at = Utc::now();
            playlist.clone()
        }))
    }

    async fn remove_video(
        &self,
        id: Uuid,
        video_id: Uuid,
    ) -> Result<Option<Playlist>, StoreError> {
        let mut playlists = self.playlists.lock().await;
        Ok(playlists.get_mut(&id).map(|playlist| {
            playlist.videos.retain(|existing| *existing != video_id);
            playlist.updated_at = Utc::now();
            playlist.clone()
        }))
    }
}
