//! # Vidshare (video sharing backend)
//!
//! `vidshare` serves account registration, cookie/bearer sessions and a small
//! catalog of videos and playlists.
//!
//! ## Sessions
//!
//! A successful login issues two signed tokens:
//!
//! - **Access token:** short lived, sent on every request through the
//!   `accessToken` cookie or an `Authorization: Bearer` header. Never persisted.
//! - **Refresh token:** long lived, persisted as the single current value on the
//!   account row. Presenting it to `/users/refresh-token` rotates both tokens and
//!   overwrites the stored value, so a superseded refresh token is rejected.
//!
//! Logging out clears the stored refresh token; there is no other session state.
//!
//! ## Media
//!
//! Avatars, cover images, video files and thumbnails are uploaded to an external
//! media host and only their URLs are stored.

pub mod api;
pub mod catalog;
pub mod cli;
pub mod error;
pub mod media;
pub mod session;
pub mod store;

pub use error::{Error, Result};

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
