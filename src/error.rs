use std::fmt;

use thiserror::Error;

/// Classification of a non-successful reply from the heatmaps API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiException {
    /// Invalid, expired or rejected bearer token
    InvalidToken,
    /// The application has not been subscribed to this API product
    ApplicationNotRegistered,
    /// Unknown area identifier, or a timestamp outside the served range
    NotFound,
    /// Too many requests
    TooManyRequests,
    UnknownError,
}

impl ApiException {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ApiException::InvalidToken,
            403 => ApiException::ApplicationNotRegistered,
            404 => ApiException::NotFound,
            429 => ApiException::TooManyRequests,
            _ => ApiException::UnknownError,
        }
    }
}

impl fmt::Display for ApiException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            ApiException::InvalidToken => "invalid token",
            ApiException::ApplicationNotRegistered => "application not registered",
            ApiException::NotFound => "not found",
            ApiException::TooManyRequests => "too many requests",
            ApiException::UnknownError => "unknown error",
        };
        write!(f, "{}", kind)
    }
}

#[derive(Debug, Error)]
pub enum HeatmapsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The secrets file is shorter than the configured line layout.
    #[error("secrets file has {found} lines, no line at index {line}")]
    MissingCredentialLine { line: usize, found: usize },

    #[error("authentication failed: {0}")]
    Auth(String),

    /// A request was attempted before `authenticate` succeeded.
    #[error("no access token, call authenticate() first")]
    NotAuthenticated,

    #[error("HTTP {status} ({kind}): {body}")]
    Http {
        status: u16,
        kind: ApiException,
        body: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("score total of {0} is not a finite number")]
    NonFiniteScore(String),

    #[error("hour {0} already has a score")]
    DuplicateHour(String),
}
