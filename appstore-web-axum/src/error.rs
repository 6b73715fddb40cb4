//! Errors returned by request handlers. All of them are rendered as plain-text responses.

use appstore::error::AppStoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Decode(String),
    #[error("{0}")]
    Encode(String),
    #[error("Unsupported content type: {0}")]
    UnsupportedMediaType(String),
    #[error("Cannot produce any of the accepted media types: {0}")]
    NotAcceptable(String),
    #[error(transparent)]
    Store(#[from] AppStoreError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            // malformed bodies answer 500, not 400
            ApiError::Decode(_) | ApiError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::NotAcceptable(_) => StatusCode::NOT_ACCEPTABLE,
            ApiError::Store(AppStoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(AppStoreError::Validation(_)) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        warn!(%status, error = %self, "Request failed.");

        (status, self.to_string()).into_response()
    }
}
