//! Error types for the classroom_dl crate.

use thiserror::Error;

use crate::models::ApiErrorResponse;

/// Errors that can occur when talking to the Classroom and Drive APIs.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("JWT encoding error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Token refresh failed: {0}")]
    TokenRefreshError(String),

    #[error("Unsupported native document type: {0}")]
    UnsupportedExport(String),
}

/// Result type alias for DownloadError.
pub type Result<T> = std::result::Result<T, DownloadError>;

/// Turn a non-success HTTP response into a [`DownloadError::ApiError`],
/// preferring the structured Google error envelope when the body parses.
pub(crate) async fn api_error(response: reqwest::Response) -> DownloadError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    if let Ok(parsed) = serde_json::from_str::<ApiErrorResponse>(&body) {
        return DownloadError::ApiError {
            status: parsed.error.code,
            message: parsed.error.message,
        };
    }
    DownloadError::ApiError {
        status,
        message: body,
    }
}
