//! Videos and playlists owned by accounts.

pub mod models;
pub mod service;

pub use models::{Playlist, Video, VideoPage};
pub use service::{CatalogService, ListVideosQuery, PublishVideoInput};
