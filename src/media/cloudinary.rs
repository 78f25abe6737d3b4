//! Cloudinary upload client (signed uploads, `auto` resource type).

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use sha1::{Digest, Sha1};
use tracing::{debug, error, instrument};

use super::{MediaError, MediaFile, MediaHost, UploadedMedia};
use crate::APP_USER_AGENT;

const DEFAULT_BASE_URL: &str = "https://api.cloudinary.com";

#[derive(Clone)]
pub struct CloudinaryConfig {
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: SecretString,
}

impl CloudinaryConfig {
    #[must_use]
    pub fn new(cloud_name: String, api_key: String, api_secret: SecretString) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cloud_name,
            api_key,
            api_secret,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    #[must_use]
    pub fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/auto/upload",
            self.base_url.trim_end_matches('/'),
            self.cloud_name
        )
    }

    /// Cloudinary signs the sorted, `&`-joined parameters followed by the API secret.
    fn signature(&self, timestamp: i64) -> String {
        let mut hasher = Sha1::new();
        hasher.update(format!("timestamp={timestamp}").as_bytes());
        hasher.update(self.api_secret.expose_secret().as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("base_url", &self.base_url)
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CloudinaryHost {
    client: Client,
    config: CloudinaryConfig,
}

impl CloudinaryHost {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: CloudinaryConfig) -> Result<Self, MediaError> {
        let client = Client::builder().user_agent(APP_USER_AGENT).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    #[instrument(skip(self, file), fields(file_name = %file.file_name, len = file.bytes.len()))]
    async fn upload(&self, file: MediaFile) -> Result<UploadedMedia, MediaError> {
        if file.bytes.is_empty() {
            return Err(MediaError::EmptyFile(file.file_name));
        }

        let timestamp = Utc::now().timestamp();
        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(content_type) = file.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("signature", self.config.signature(timestamp));

        let upload_url = self.config.upload_url();
        let response = self
            .client
            .post(&upload_url)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let json_response: Value = response.json().await.unwrap_or(Value::Null);
            let message = json_response["error"]["message"]
                .as_str()
                .unwrap_or_default()
                .to_string();

            error!("Upload to {} failed: {} {}", upload_url, status, message);

            return Err(MediaError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let json_response: Value = response.json().await?;

        let url = json_response["secure_url"]
            .as_str()
            .or_else(|| json_response["url"].as_str())
            .ok_or_else(|| MediaError::Response("no url found".to_string()))?;
        let public_id = json_response["public_id"].as_str().unwrap_or_default();

        debug!("uploaded media {}", public_id);

        Ok(UploadedMedia {
            url: url.to_string(),
            public_id: public_id.to_string(),
            duration: json_response["duration"].as_f64(),
        })
    }
}
