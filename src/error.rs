//! Unified error handling.
//!
//! One error enum for per-frame session handling, one for the admin HTTP
//! surface, and one (in `db`) for the repository layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::wire::ServerEvent;

/// Errors surfaced while processing one inbound frame from a session.
///
/// Every variant maps to an in-band `error`/`banned`/`rate_limited`/
/// `message_flagged` frame rather than tearing down the connection, except
/// [`SessionError::Fatal`] which signals the router to close the channel.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not connected to a partner")]
    NotPaired,

    #[error("already in queue or paired")]
    IllegalState,

    #[error("invalid message")]
    InvalidMessage,

    #[error("invalid media")]
    InvalidMedia,

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("message flagged: {0}")]
    Flagged(String),

    #[error("service unavailable")]
    ServiceUnavailable,

    #[error("fatal: {0}")]
    Fatal(String),
}

impl SessionError {
    /// Static error code for metrics labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotPaired => "not_paired",
            Self::IllegalState => "illegal_state",
            Self::InvalidMessage => "invalid_message",
            Self::InvalidMedia => "invalid_media",
            Self::RateLimited(_) => "rate_limited",
            Self::Flagged(_) => "flagged",
            Self::ServiceUnavailable => "service_unavailable",
            Self::Fatal(_) => "fatal",
        }
    }

    /// Convert to the in-band frame a client should receive, or `None` when
    /// the error is fatal and the router should close the channel instead.
    pub fn to_frame(&self) -> Option<ServerEvent> {
        match self {
            Self::NotPaired => Some(ServerEvent::Error {
                message: "Not connected to a partner".into(),
            }),
            Self::IllegalState => Some(ServerEvent::Error {
                message: "Invalid action for current state".into(),
            }),
            Self::InvalidMessage => Some(ServerEvent::Error {
                message: "Invalid message".into(),
            }),
            Self::InvalidMedia => Some(ServerEvent::Error {
                message: "Invalid media".into(),
            }),
            Self::RateLimited(msg) => Some(ServerEvent::RateLimited { message: msg.clone() }),
            Self::Flagged(msg) => Some(ServerEvent::MessageFlagged { message: msg.clone() }),
            Self::ServiceUnavailable => Some(ServerEvent::Error {
                message: "service unavailable".into(),
            }),
            Self::Fatal(_) => None,
        }
    }
}

/// Errors surfaced by the admin/appeals JSON HTTP surface.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("{0}")]
    Validation(String),

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error(transparent)]
    Repo(#[from] crate::db::RepoError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AdminError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AdminError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AdminError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AdminError::Internal(_) | AdminError::Repo(_) => {
                tracing::error!(error = %self, "admin request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, axum::Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_paired_maps_to_error_frame() {
        let err = SessionError::NotPaired;
        match err.to_frame() {
            Some(ServerEvent::Error { message }) => {
                assert_eq!(message, "Not connected to a partner")
            }
            _ => panic!("expected error frame"),
        }
    }

    #[test]
    fn fatal_has_no_frame() {
        assert!(SessionError::Fatal("boom".into()).to_frame().is_none());
    }
}
