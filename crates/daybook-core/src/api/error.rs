use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::storage::StoreError;

/// Message used when an error response carries no readable `message`
pub const GENERIC_FAILURE_MESSAGE: &str = "Request failed";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Session expired. Please login again.")]
    SessionExpired,

    #[error("{message}")]
    RequestFailed { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Token storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// The failure taxonomy callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No valid credential; nothing was sent
    AuthenticationRequired,
    /// The server answered 401; the credential has been cleared
    SessionExpired,
    /// Any other non-2xx answer
    RequestFailed,
    /// Transport failure or an unreadable response body
    NetworkError,
    /// The local token store could not be read or written
    Storage,
    /// The request itself could not be built
    InvalidRequest,
}

/// Maximum length for error response bodies in log messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::AuthenticationRequired => ErrorKind::AuthenticationRequired,
            ApiError::SessionExpired => ErrorKind::SessionExpired,
            ApiError::RequestFailed { .. } => ErrorKind::RequestFailed,
            ApiError::Network(_) | ApiError::InvalidResponse(_) => ErrorKind::NetworkError,
            ApiError::Storage(_) => ErrorKind::Storage,
            ApiError::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    /// HTTP status of a failed request, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::SessionExpired => Some(StatusCode::UNAUTHORIZED),
            ApiError::RequestFailed { status, .. } => Some(*status),
            ApiError::Network(e) => e.status(),
            _ => None,
        }
    }

    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Build the error for a non-2xx, non-401 response.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
        ApiError::RequestFailed { status, message }
    }
}
