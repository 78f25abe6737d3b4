//! Media host (Cloudinary) arguments.

use clap::{Arg, Command};

pub const ARG_MEDIA_URL: &str = "media-url";
pub const ARG_MEDIA_CLOUD_NAME: &str = "media-cloud-name";
pub const ARG_MEDIA_API_KEY: &str = "media-api-key";
pub const ARG_MEDIA_API_SECRET: &str = "media-api-secret";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_MEDIA_URL)
                .long(ARG_MEDIA_URL)
                .help("Media host API base URL")
                .env("VIDSHARE_MEDIA_URL")
                .default_value("https://api.cloudinary.com"),
        )
        .arg(
            Arg::new(ARG_MEDIA_CLOUD_NAME)
                .long(ARG_MEDIA_CLOUD_NAME)
                .help("Media host cloud name")
                .env("VIDSHARE_MEDIA_CLOUD_NAME")
                .required(true),
        )
        .arg(
            Arg::new(ARG_MEDIA_API_KEY)
                .long(ARG_MEDIA_API_KEY)
                .help("Media host API key")
                .env("VIDSHARE_MEDIA_API_KEY")
                .required(true),
        )
        .arg(
            Arg::new(ARG_MEDIA_API_SECRET)
                .long(ARG_MEDIA_API_SECRET)
                .help("Media host API secret")
                .env("VIDSHARE_MEDIA_API_SECRET")
                .hide_env_values(true)
                .required(true),
        )
}
