use crate::{
    api::handlers::{health, root},
    catalog::CatalogService,
    media::{CloudinaryConfig, CloudinaryHost},
    session::{SessionService, TokenConfig, TokenIssuer},
    store::PgStore,
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method, Request},
    routing::{get, options},
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{debug_span, info, warn, Span};
use ulid::Ulid;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

pub(crate) mod error;
pub(crate) mod handlers;
mod openapi;

pub use error::{ApiResponse, ErrorBody};
pub use handlers::auth::{AuthConfig, AuthState};
pub use openapi::openapi;

/// Build the API router with all documented routes registered.
#[must_use]
pub fn router() -> OpenApiRouter {
    openapi::api_router()
}

/// Routes plus the undocumented extras, with services attached as extensions.
///
/// Transport layers (CORS, request id, tracing) are added by [`new`].
pub fn app(auth_state: Arc<AuthState>, catalog: Arc<CatalogService>) -> Router {
    let max_upload_bytes = auth_state.config().max_upload_bytes();
    let (router, _openapi) = router().split_for_parts();

    router
        .route("/", get(root::root))
        .route("/health", options(health::health))
        .fallback(root::not_found)
        .method_not_allowed_fallback(root::method_not_allowed)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(Extension(auth_state))
        .layer(Extension(catalog))
}

/// router
/// # Errors
/// Returns an error if the database is unreachable, the media client cannot be
/// built or the server fails to start
pub async fn new(
    port: u16,
    dsn: String,
    auth_config: AuthConfig,
    token_config: &TokenConfig,
    media_config: CloudinaryConfig,
) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let store = Arc::new(PgStore::new(pool));
    store
        .apply_schema()
        .await
        .context("Failed to apply database schema")?;

    let media = Arc::new(CloudinaryHost::new(media_config).context("Failed to build media client")?);

    let sessions = Arc::new(SessionService::new(
        store.clone(),
        TokenIssuer::new(token_config),
        media.clone(),
    ));
    let catalog = Arc::new(CatalogService::new(store.clone(), store, media));

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(AllowOrigin::exact(frontend_origin(
            auth_config.frontend_origin(),
        )))
        .allow_credentials(true);

    let auth_state = Arc::new(AuthState::new(auth_config, sessions));

    let app = app(auth_state, catalog)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors),
        );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {err}");
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let headers = request.headers();
    let path = request.uri().path();
    let method = request.method().as_str();
    let request_id = headers
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    // Headers are not recorded, they carry cookies and bearer tokens.
    debug_span!("http.request", method, path, request_id)
}

// Credentialed CORS needs an exact origin; fall back to the default dev origin.
fn frontend_origin(url: &str) -> HeaderValue {
    let origin = url.trim().trim_end_matches('/');
    HeaderValue::from_str(origin).unwrap_or_else(|_| {
        warn!("Invalid frontend origin {url:?}, using http://localhost:3000");
        HeaderValue::from_static("http://localhost:3000")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontend_origin_trims_trailing_slash() {
        assert_eq!(
            frontend_origin("https://app.example.com/"),
            HeaderValue::from_static("https://app.example.com")
        );
    }

    #[test]
    fn frontend_origin_falls_back_on_invalid_value() {
        assert_eq!(
            frontend_origin("bad\norigin"),
            HeaderValue::from_static("http://localhost:3000")
        );
    }

    #[test]
    fn make_span_reads_request_id() {
        let request = Request::builder()
            .uri("/users/me")
            .header("x-request-id", "01J0000000000000000000000")
            .body(Body::empty());
        assert!(request.is_ok());
        if let Ok(request) = request {
            let _span = make_span(&request);
        }
    }
}
