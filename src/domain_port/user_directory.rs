use crate::domain_model::{Email, Role};
use serde::Deserialize;

/// One row of the registered-users sheet.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryEntry {
    pub email: String,
    pub display_name: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_role() -> String {
    "player".to_string()
}

fn default_active() -> bool {
    true
}

impl DirectoryEntry {
    pub fn role(&self) -> Role {
        Role::parse_lenient(&self.role)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &Email)
    -> Result<Option<DirectoryEntry>, DirectoryError>;
}
