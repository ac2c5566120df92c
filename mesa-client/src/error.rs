//! Client error types

use shared::error::ApiError;
use shared::models::OrderStatus;
use thiserror::Error;

use crate::realtime::EventError;
use crate::session::SessionError;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server rejected the request with a structured error body
    #[error("API error: {0}")]
    Api(ApiError),

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Claim race or state conflict; the server state already moved on
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Rejected locally: the requested status change skips the lifecycle order
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Push event stream failure
    #[error("Event stream error: {0}")]
    Event(#[from] EventError),

    /// Session persistence failure
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// True for failures where another actor won a race (claim taken,
    /// record advanced or deleted). Callers treat these as corrections,
    /// not faults: the next authoritative record resolves the view.
    pub fn is_conflict(&self) -> bool {
        match self {
            ClientError::Conflict(_) | ClientError::NotFound(_) => true,
            ClientError::InvalidTransition { .. } => true,
            ClientError::Api(err) => err.is_conflict(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn conflicts_are_detected_across_variants() {
        assert!(ClientError::Conflict("order already claimed".into()).is_conflict());
        assert!(ClientError::NotFound("order".into()).is_conflict());
        assert!(
            ClientError::Api(ApiError::new(ErrorCode::OrderAlreadyClaimed)).is_conflict()
        );
        assert!(!ClientError::Unauthorized.is_conflict());
        assert!(!ClientError::Validation("missing email".into()).is_conflict());
    }

    #[test]
    fn invalid_transition_names_both_states() {
        let err = ClientError::InvalidTransition {
            from: OrderStatus::Ready,
            to: OrderStatus::Pending,
        };
        assert_eq!(err.to_string(), "Invalid transition: ready -> pending");
    }
}
