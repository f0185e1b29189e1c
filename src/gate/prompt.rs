use crate::application_port::RenewalReason;
use std::fmt;

/// Text for the "renew session" banner shown when automatic renewal gives up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewalPrompt {
    pub title: String,
    pub body: String,
    pub action: String,
}

impl From<&RenewalReason> for RenewalPrompt {
    fn from(reason: &RenewalReason) -> Self {
        let (title, body, action) = match reason {
            RenewalReason::PopupBlocked => (
                "Session renewal blocked",
                "The browser blocked the sign-in popup. Allow popups for this site and renew your session.".to_string(),
                "Allow popups and renew",
            ),
            RenewalReason::UserCancelled => (
                "Session renewal cancelled",
                "The sign-in window was closed before renewal finished.".to_string(),
                "Renew session",
            ),
            RenewalReason::TimedOut => (
                "Session renewal timed out",
                "Your session could not be renewed in time.".to_string(),
                "Try again",
            ),
            RenewalReason::SessionRevoked => (
                "Session ended",
                "Your access was revoked or has expired. Sign in again to continue.".to_string(),
                "Sign in",
            ),
            RenewalReason::Failed(detail) => (
                "Session renewal failed",
                format!("Your session could not be renewed ({detail})."),
                "Renew session",
            ),
        };
        Self {
            title: title.to_string(),
            body,
            action: action.to_string(),
        }
    }
}

impl fmt::Display for RenewalPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.title, self.body, self.action)
    }
}
