//! API handlers and shared request helpers.

pub mod auth;
pub mod health;
pub mod me;
pub mod playlists;
pub mod root;
pub mod videos;

#[cfg(test)]
pub(crate) mod test_support;

use axum::{
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use std::collections::HashMap;
use tracing::debug;

use crate::{error::Error, media::MediaFile};

/// Text fields and files of a multipart body, keyed by field name.
///
/// File inputs submitted without content are treated as absent.
#[derive(Debug, Default)]
pub(crate) struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, MediaFile>,
}

impl FormData {
    pub(crate) async fn read(
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Self, Error> {
        let mut multipart = multipart.map_err(|err| Error::validation(err.body_text()))?;
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if let Some(file_name) = field.file_name().map(str::to_string) {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if bytes.is_empty() {
                    continue;
                }
                form.files.insert(
                    name,
                    MediaFile {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    },
                );
            } else {
                let text = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, text);
            }
        }

        Ok(form)
    }

    pub(crate) fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    pub(crate) fn take_file(&mut self, name: &str) -> Option<MediaFile> {
        self.files.remove(name)
    }
}

fn multipart_error(err: MultipartError) -> Error {
    debug!("Rejected multipart body: {err}");
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::payload_too_large(err.body_text())
    } else {
        Error::validation(err.body_text())
    }
}

pub(crate) fn json_error(err: &JsonRejection) -> Error {
    Error::validation(err.body_text())
}

pub(crate) fn path_error(err: &PathRejection) -> Error {
    Error::validation(err.body_text())
}

pub(crate) fn query_error(err: &QueryRejection) -> Error {
    Error::validation(err.body_text())
}
