use crate::domain_model::{Credential, Identity, Role};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(pub uuid::Uuid);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A signed-in user: the bearer credential plus who it belongs to.
///
/// Created on sign-in, updated in place by [`Session::apply_refresh`] and
/// dropped from the store on sign-out or a terminal refresh failure.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: SessionId,
    pub credential: Credential,
    pub identity: Identity,
    pub created_at: DateTime<Utc>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(credential: Credential, identity: Identity) -> Self {
        Self {
            id: SessionId(uuid::Uuid::new_v4()),
            credential,
            identity,
            created_at: Utc::now(),
            refreshed_at: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.identity.role == Role::Admin
    }

    pub fn is_manager(&self) -> bool {
        matches!(self.identity.role, Role::Admin | Role::Manager)
    }

    pub fn apply_refresh(&mut self, credential: Credential) {
        self.credential = credential;
        self.refreshed_at = Some(Utc::now());
    }
}
