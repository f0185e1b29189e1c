use crate::application_port::{RenewalReason, TransportError};

#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected status {status}")]
    Status { status: u16, body: String },
    #[error("session renewal needed: {0}")]
    RenewalNeeded(RenewalReason),
    #[error("not signed in")]
    NotSignedIn,
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Failures worth another attempt once a fresh credential is in hand.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Timeout | ApiError::Network(_) => true,
            ApiError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Timeout => ApiError::Timeout,
            TransportError::Network(e) => ApiError::Network(e),
        }
    }
}
