//! Router harness for handler tests, backed by the in-memory store.

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE},
        Method, Request, Response,
    },
    Router,
};
use secrecy::SecretString;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use super::auth::{AuthConfig, AuthState};
use crate::{
    api::app,
    catalog::CatalogService,
    media::fake::FakeMediaHost,
    session::{SessionService, TokenConfig, TokenIssuer},
    store::memory::MemoryStore,
};

const BOUNDARY: &str = "vidshare-test-boundary";

pub(crate) struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_media(FakeMediaHost::new())
    }

    pub fn with_media(media: FakeMediaHost) -> Self {
        Self::with_config(media, AuthConfig::default().with_cookie_secure(false))
    }

    pub fn with_config(media: FakeMediaHost, auth_config: AuthConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let media = Arc::new(media);
        let config = TokenConfig::new(
            SecretString::from("access-secret".to_string()),
            SecretString::from("refresh-secret".to_string()),
        );
        let sessions = Arc::new(SessionService::new(
            store.clone(),
            TokenIssuer::new(&config),
            media.clone(),
        ));
        let catalog = Arc::new(CatalogService::new(store.clone(), store.clone(), media));
        let auth_state = Arc::new(AuthState::new(auth_config, sessions));

        Self {
            router: app(auth_state, catalog),
            store,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Result<Response<Body>> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .context("router failed")
    }

    /// Register `username` with an avatar and log in, returning the login response body.
    pub async fn signed_in(&self, username: &str) -> Result<Session> {
        let email = format!("{username}@x.com");
        let form = Multipart::new()
            .text("fullName", username)
            .text("email", &email)
            .text("username", username)
            .text("password", "pw1")
            .file("avatar", "avatar.png", b"png");
        let response = self
            .send(form.request(Method::POST, "/users/register", None)?)
            .await?;
        anyhow::ensure!(
            response.status().as_u16() == 201,
            "register failed: {}",
            response.status()
        );

        let response = self
            .send(json_request(
                Method::POST,
                "/users/login",
                None,
                &serde_json::json!({"username": username, "password": "pw1"}),
            )?)
            .await?;
        anyhow::ensure!(response.status().is_success(), "login failed");
        let body = body_json(response).await?;
        Session::from_login(&body)
    }
}

pub(crate) struct Session {
    pub id: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl Session {
    fn from_login(body: &Value) -> Result<Self> {
        let field = |pointer: &str| {
            body.pointer(pointer)
                .and_then(Value::as_str)
                .map(str::to_string)
                .with_context(|| format!("missing {pointer}"))
        };
        Ok(Self {
            id: field("/data/user/id")?,
            access_token: field("/data/accessToken")?,
            refresh_token: field("/data/refreshToken")?,
        })
    }
}

/// Minimal `multipart/form-data` body builder.
#[derive(Default)]
pub(crate) struct Multipart {
    body: Vec<u8>,
}

impl Multipart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn request(mut self, method: Method, uri: &str, token: Option<&str>) -> Result<Request<Body>> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(self.body)).context("build multipart request")
    }
}

pub(crate) fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> Result<Request<Body>> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(body)?))
        .context("build json request")
}

pub(crate) fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Result<Request<Body>> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).context("build request")
}

pub(crate) fn cookie_request(method: Method, uri: &str, cookie: &str) -> Result<Request<Body>> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .context("build cookie request")
}

pub(crate) async fn body_json(response: Response<Body>) -> Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    serde_json::from_slice(&bytes).context("response body is not json")
}

/// Value of the `name` cookie in the response's `Set-Cookie` headers.
pub(crate) fn set_cookie(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| {
            let pair = value.split(';').next()?;
            let (key, val) = pair.split_once('=')?;
            (key.trim() == name).then(|| val.trim().to_string())
        })
}
