use crate::application_port::ProviderError;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum RenewalReason {
    #[error("sign-in popup was blocked")]
    PopupBlocked,
    #[error("sign-in was cancelled")]
    UserCancelled,
    #[error("renewal timed out")]
    TimedOut,
    #[error("session was revoked")]
    SessionRevoked,
    #[error("renewal failed: {0}")]
    Failed(String),
}

impl From<ProviderError> for RenewalReason {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::PopupBlocked => RenewalReason::PopupBlocked,
            ProviderError::Cancelled => RenewalReason::UserCancelled,
            ProviderError::InvalidGrant => RenewalReason::SessionRevoked,
            ProviderError::Timeout => RenewalReason::TimedOut,
            ProviderError::Network(e) => RenewalReason::Failed(e),
            ProviderError::Other(e) => RenewalReason::Failed(e),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenewalNotice {
    pub reason: RenewalReason,
    pub raised_at: DateTime<Utc>,
}

impl RenewalNotice {
    pub fn new(reason: RenewalReason) -> Self {
        Self {
            reason,
            raised_at: Utc::now(),
        }
    }
}

/// Told whenever automatic renewal gives up and the user has to renew by hand.
pub trait RenewalListener: Send + Sync {
    fn renewal_needed(&self, notice: RenewalNotice);
}
