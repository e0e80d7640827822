use std::io;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("model error: {0}")]
    Model(String),
    #[error("render error: {0}")]
    Render(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

const ERROR_PAGE: &str = "
    An internal error occurred.
    See logs for full stacktrace.
    ";
const BAD_REQUEST_PAGE: &str = "
    The request could not be processed.
    Check the issue URL or text and try again.
    ";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, page) = match &self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, BAD_REQUEST_PAGE),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, ERROR_PAGE),
        };
        tracing::error!(error = %self, status = status.as_u16(), "request failed");
        (status, Html(page)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_errors_map_to_internal_server_error() {
        let response = AppError::Upstream("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bad_requests_keep_client_status() {
        let response = AppError::BadRequest("not a github url".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn error_page_does_not_leak_details() {
        use http_body_util::BodyExt;

        let response =
            AppError::ResourceUnavailable("/secret/path.csv".to_string()).into_response();
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/html"));

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let page = String::from_utf8_lossy(&body);
        assert!(page.contains("An internal error occurred"));
        assert!(!page.contains("/secret/path.csv"));
    }
}
