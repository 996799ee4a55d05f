// @awa-component: RVW-Errors
//
//! Error types for the review data client.

use std::fmt;
use std::sync::Arc;

use reqwest::StatusCode;
use thiserror::Error;

/// Network operation that produced an HTTP error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchReviews,
    FetchProduct,
    FetchShop,
    SubmitReview,
    FetchRating,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::FetchReviews => "fetch reviews",
            Operation::FetchProduct => "fetch product",
            Operation::FetchShop => "fetch shop info",
            Operation::SubmitReview => "submit review",
            Operation::FetchRating => "fetch rating",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure while reading page/environment signals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SignalError(pub String);

/// Errors returned by [`crate::ReviewClient`] and [`crate::RatingClient`].
///
/// `Clone` so a single failed fetch can be handed to every caller waiting on
/// it; the wrapped library errors sit behind `Arc` for that reason.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("Failed to {operation}: {status_text}")]
    Http {
        operation: Operation,
        status: StatusCode,
        status_text: String,
    },

    #[error(transparent)]
    Transport(Arc<reqwest::Error>),

    #[error(transparent)]
    Json(Arc<serde_json::Error>),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Page signal error: {0}")]
    Signal(#[from] SignalError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Cached value for key '{0}' has an unexpected type")]
    CacheMismatch(String),

    #[error("Fetch task failed: {0}")]
    Task(String),
}

impl ClientError {
    /// Build an HTTP error from a non-success status.
    pub fn http(operation: Operation, status: StatusCode) -> Self {
        ClientError::Http {
            operation,
            status,
            status_text: status
                .canonical_reason()
                .unwrap_or(status.as_str())
                .to_string(),
        }
    }

    /// HTTP status of the failed response, if this is an HTTP error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(Arc::new(e))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Json(Arc::new(e))
    }
}
