//! Error types for the HTTP layer.
//!
//! [`WikiError`] is the only place failures become user-visible. It is
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use leaflet_store::StoreError;

/// Errors that can occur while serving a page request.
#[derive(Debug, thiserror::Error)]
pub enum WikiError {
    /// The title in the request path cannot name a page.
    #[error("{0}")]
    InvalidTitle(String),

    /// The page store failed.
    #[error("{0}")]
    Storage(String),

    /// A page template failed to load or render.
    #[error("template error: {0}")]
    Template(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for WikiError {
    fn from(err: StoreError) -> Self {
        if err.is_invalid_title() {
            Self::InvalidTitle(err.to_string())
        } else {
            Self::Storage(err.to_string())
        }
    }
}

impl From<minijinja::Error> for WikiError {
    fn from(err: minijinja::Error) -> Self {
        Self::Template(err.to_string())
    }
}

impl IntoResponse for WikiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidTitle(_) => StatusCode::BAD_REQUEST,
            Self::Storage(_) | Self::Template(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
