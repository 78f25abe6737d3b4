//! Test double for the media host.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{MediaError, MediaFile, MediaHost, UploadedMedia};

#[derive(Default)]
pub struct FakeMediaHost {
    /// Uploads whose file name is listed here are rejected.
    failing_names: Vec<String>,
    fail_all: bool,
    uploads: AtomicUsize,
}

impl FakeMediaHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    pub fn failing_on(name: &str) -> Self {
        Self {
            failing_names: vec![name.to_string()],
            ..Self::default()
        }
    }

    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

pub fn file(name: &str) -> MediaFile {
    MediaFile {
        file_name: name.to_string(),
        content_type: Some("application/octet-stream".to_string()),
        bytes: b"bytes".to_vec(),
    }
}

#[async_trait]
impl MediaHost for FakeMediaHost {
    async fn upload(&self, file: MediaFile) -> Result<UploadedMedia, MediaError> {
        if self.fail_all || self.failing_names.contains(&file.file_name) {
            return Err(MediaError::Rejected {
                status: 500,
                message: "upload failed".to_string(),
            });
        }
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(UploadedMedia {
            url: format!("https://media.test/{}", file.file_name),
            public_id: file.file_name,
            duration: Some(42.0),
        })
    }
}
