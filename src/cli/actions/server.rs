use crate::{
    api::{self, AuthConfig},
    media::CloudinaryConfig,
    session::TokenConfig,
};
use anyhow::{bail, Result};
use secrecy::SecretString;
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub access_token_secret: SecretString,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_secret: SecretString,
    pub refresh_token_ttl_seconds: i64,
    pub cookie_secure: bool,
    pub cors_origin: String,
    pub max_upload_bytes: usize,
    pub media_url: String,
    pub media_cloud_name: String,
    pub media_api_key: String,
    pub media_api_secret: SecretString,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the token secrets are identical, the database is
/// unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let token_config = token_config(&args)?;
    log_startup_args(&args);

    let auth_config = AuthConfig::new(args.cors_origin)
        .with_cookie_secure(args.cookie_secure)
        .with_max_upload_bytes(args.max_upload_bytes);

    let media_config = CloudinaryConfig::new(
        args.media_cloud_name,
        args.media_api_key,
        args.media_api_secret,
    )
    .with_base_url(args.media_url);

    api::new(args.port, args.dsn, auth_config, &token_config, media_config).await
}

fn token_config(args: &Args) -> Result<TokenConfig> {
    let config = TokenConfig::new(
        args.access_token_secret.clone(),
        args.refresh_token_secret.clone(),
    )
    .with_access_ttl_seconds(args.access_token_ttl_seconds)
    .with_refresh_ttl_seconds(args.refresh_token_ttl_seconds);

    if config.secrets_collide() {
        bail!("access and refresh token secrets must differ");
    }
    Ok(config)
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("dsn", redact_dsn(&args.dsn)),
        ("access_token_ttl", format!("{}s", args.access_token_ttl_seconds)),
        ("refresh_token_ttl", format!("{}s", args.refresh_token_ttl_seconds)),
        ("cookie_secure", args.cookie_secure.to_string()),
        ("cors_origin", args.cors_origin.clone()),
        ("max_upload_bytes", args.max_upload_bytes.to_string()),
        ("media_url", args.media_url.clone()),
        ("media_cloud_name", args.media_cloud_name.clone()),
    ];
    log_entries("Startup configuration", &entries);
}

fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("REDACTED"));
            }
            parsed.to_string()
        }
        Err(_) => "invalid-dsn".to_string(),
    }
}

fn log_entries(title: &str, entries: &[(&str, String)]) {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} ({})\n\n{title}:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn short_commit(hash: &str) -> String {
    let trimmed = hash.trim();
    if trimmed.len() > 7 {
        trimmed[..7].to_string()
    } else {
        trimmed.to_string()
    }
}
