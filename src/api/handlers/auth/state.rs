//! Auth state and transport configuration.

use std::sync::Arc;

use crate::session::{SessionService, TokenKind};

const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_origin: String,
    cookie_secure: bool,
    max_upload_bytes: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FRONTEND_ORIGIN.to_string())
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_origin: String) -> Self {
        Self {
            frontend_origin,
            cookie_secure: true,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    #[must_use]
    pub fn frontend_origin(&self) -> &str {
        &self.frontend_origin
    }

    /// Only mark cookies secure when the frontend is served over HTTPS.
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    #[must_use]
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }
}

pub struct AuthState {
    config: AuthConfig,
    sessions: Arc<SessionService>,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, sessions: Arc<SessionService>) -> Self {
        Self { config, sessions }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    /// Cookie lifetime mirrors the token lifetime.
    #[must_use]
    pub fn cookie_max_age(&self, kind: TokenKind) -> i64 {
        self.sessions.token_ttl_seconds(kind).max(0)
    }
}
