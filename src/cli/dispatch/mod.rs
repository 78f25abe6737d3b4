use crate::cli::{
    actions::{server::Args, Action},
    commands::{auth, media},
};
use anyhow::{Context, Result};
use secrecy::SecretString;

fn required(matches: &clap::ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing required argument: --{name}"))
}

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = required(matches, "dsn")?;

    Ok(Action::Server(Args {
        port,
        dsn,
        access_token_secret: SecretString::from(required(matches, auth::ARG_ACCESS_TOKEN_SECRET)?),
        access_token_ttl_seconds: matches
            .get_one::<i64>(auth::ARG_ACCESS_TOKEN_TTL_SECONDS)
            .copied()
            .unwrap_or(crate::session::tokens::DEFAULT_ACCESS_TTL_SECONDS),
        refresh_token_secret: SecretString::from(required(
            matches,
            auth::ARG_REFRESH_TOKEN_SECRET,
        )?),
        refresh_token_ttl_seconds: matches
            .get_one::<i64>(auth::ARG_REFRESH_TOKEN_TTL_SECONDS)
            .copied()
            .unwrap_or(crate::session::tokens::DEFAULT_REFRESH_TTL_SECONDS),
        cookie_secure: matches
            .get_one::<bool>(auth::ARG_COOKIE_SECURE)
            .copied()
            .unwrap_or(true),
        cors_origin: required(matches, auth::ARG_CORS_ORIGIN)?,
        max_upload_bytes: matches
            .get_one::<usize>(auth::ARG_MAX_UPLOAD_BYTES)
            .copied()
            .context("missing argument: --max-upload-bytes")?,
        media_url: required(matches, media::ARG_MEDIA_URL)?,
        media_cloud_name: required(matches, media::ARG_MEDIA_CLOUD_NAME)?,
        media_api_key: required(matches, media::ARG_MEDIA_API_KEY)?,
        media_api_secret: SecretString::from(required(matches, media::ARG_MEDIA_API_SECRET)?),
    }))
}
