//! External media host used for avatars, cover images, videos and thumbnails.

use async_trait::async_trait;
use thiserror::Error;

pub mod cloudinary;
#[cfg(test)]
pub mod fake;

pub use cloudinary::{CloudinaryConfig, CloudinaryHost};

/// A file received from a multipart request, held in memory until uploaded.
#[derive(Clone)]
pub struct MediaFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for MediaFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadedMedia {
    pub url: String,
    pub public_id: String,
    /// Only reported for audio/video uploads.
    pub duration: Option<f64>,
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("empty file: {0}")]
    EmptyFile(String),
    #[error("media host request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("media host rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected media host response: {0}")]
    Response(String),
}

#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, file: MediaFile) -> Result<UploadedMedia, MediaError>;
}
