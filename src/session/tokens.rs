//! Access and refresh token issuance (HS256 JWTs).
//!
//! The two token kinds are signed with different secrets, so an access token
//! never verifies as a refresh token and vice versa.

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ulid::Ulid;
use uuid::Uuid;

use super::models::Account;

pub const DEFAULT_ACCESS_TTL_SECONDS: i64 = 15 * 60;
pub const DEFAULT_REFRESH_TTL_SECONDS: i64 = 10 * 24 * 60 * 60;

#[derive(Clone)]
pub struct TokenConfig {
    access_secret: SecretString,
    access_ttl_seconds: i64,
    refresh_secret: SecretString,
    refresh_ttl_seconds: i64,
}

impl TokenConfig {
    #[must_use]
    pub fn new(access_secret: SecretString, refresh_secret: SecretString) -> Self {
        Self {
            access_secret,
            access_ttl_seconds: DEFAULT_ACCESS_TTL_SECONDS,
            refresh_secret,
            refresh_ttl_seconds: DEFAULT_REFRESH_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_access_ttl_seconds(mut self, ttl: i64) -> Self {
        self.access_ttl_seconds = ttl;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl_seconds(mut self, ttl: i64) -> Self {
        self.refresh_ttl_seconds = ttl;
        self
    }

    #[must_use]
    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_seconds
    }

    #[must_use]
    pub fn refresh_ttl_seconds(&self) -> i64 {
        self.refresh_ttl_seconds
    }

    /// True when both kinds would be signed with the same secret.
    #[must_use]
    pub fn secrets_collide(&self) -> bool {
        self.access_secret.expose_secret() == self.refresh_secret.expose_secret()
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("access_secret", &"***")
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_secret", &"***")
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token invalid")]
    Invalid,
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    /// Unique per token, so two tokens minted in the same second still differ.
    pub jti: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl KeyPair {
    fn new(secret: &SecretString, ttl_seconds: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl_seconds,
        }
    }
}

pub struct TokenIssuer {
    access: KeyPair,
    refresh: KeyPair,
    validation: Validation,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            access: KeyPair::new(&config.access_secret, config.access_ttl_seconds),
            refresh: KeyPair::new(&config.refresh_secret, config.refresh_ttl_seconds),
            validation,
        }
    }

    fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    #[must_use]
    pub fn ttl_seconds(&self, kind: TokenKind) -> i64 {
        self.keys(kind).ttl_seconds
    }

    fn sign(&self, kind: TokenKind, mut claims: Claims) -> Result<String, TokenError> {
        let keys = self.keys(kind);
        let now = Utc::now().timestamp();
        claims.iat = now;
        claims.exp = now.saturating_add(keys.ttl_seconds);
        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).map_err(TokenError::Signing)
    }

    /// Access tokens carry the public identity fields alongside the account id.
    ///
    /// # Errors
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue_access(&self, account: &Account) -> Result<String, TokenError> {
        self.sign(
            TokenKind::Access,
            Claims {
                sub: account.id.to_string(),
                exp: 0,
                iat: 0,
                jti: Ulid::new().to_string(),
                username: Some(account.username.clone()),
                email: Some(account.email.clone()),
                full_name: Some(account.full_name.clone()),
            },
        )
    }

    /// # Errors
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue_refresh(&self, account_id: Uuid) -> Result<String, TokenError> {
        self.sign(
            TokenKind::Refresh,
            Claims {
                sub: account_id.to_string(),
                exp: 0,
                iat: 0,
                jti: Ulid::new().to_string(),
                username: None,
                email: None,
                full_name: None,
            },
        )
    }

    /// Verify signature and expiry, returning the account id.
    ///
    /// # Errors
    /// `Expired` once `exp` has passed, `Invalid` for anything else.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Uuid, TokenError> {
        let data = decode::<Claims>(token, &self.keys(kind).decoding, &self.validation).map_err(
            |err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            },
        )?;
        Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::Invalid)
    }
}
