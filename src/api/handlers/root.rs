use axum::{http::StatusCode, response::IntoResponse};

use crate::{api::error::ErrorBody, error::Error};

// axum handler for /
pub async fn root() -> impl IntoResponse {
    format!(
        "{} {} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        crate::GIT_COMMIT_HASH
    )
}

// Unmatched paths.
pub async fn not_found() -> Error {
    Error::not_found("Route not found")
}

// Known path, unsupported method.
pub async fn method_not_allowed() -> ErrorBody {
    ErrorBody::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

#[cfg(test)]
mod tests {
    use crate::api::handlers::test_support::{body_json, empty_request, TestApp};
    use anyhow::Result;
    use axum::http::{Method, StatusCode};
    use serde_json::Value;

    #[tokio::test]
    async fn unknown_route_uses_error_envelope() -> Result<()> {
        let app = TestApp::new();
        let response = app
            .send(empty_request(Method::GET, "/users/nope", None)?)
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await?;
        assert_eq!(body["statusCode"], 404);
        assert_eq!(body["message"], "Route not found");
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"], Value::Array(Vec::new()));
        Ok(())
    }

    #[tokio::test]
    async fn wrong_method_uses_error_envelope() -> Result<()> {
        let app = TestApp::new();
        let response = app
            .send(empty_request(Method::GET, "/users/login", None)?)
            .await?;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let body = body_json(response).await?;
        assert_eq!(body["statusCode"], 405);
        assert_eq!(body["message"], "Method not allowed");
        assert_eq!(body["success"], false);
        Ok(())
    }

    #[tokio::test]
    async fn root_reports_version() -> Result<()> {
        let app = TestApp::new();
        let response = app.send(empty_request(Method::GET, "/", None)?).await?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }
}
