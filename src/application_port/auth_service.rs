use crate::application_port::ProviderError;
use crate::domain_model::{Email, Session};
use crate::domain_port::DirectoryError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0} is not registered")]
    NotRegistered(Email),
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("store error: {0}")]
    Store(String),
}

impl From<DirectoryError> for AuthError {
    fn from(err: DirectoryError) -> Self {
        AuthError::Store(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in(&self) -> Result<Session, AuthError>;
    async fn sign_out(&self) -> Result<(), AuthError>;
    /// Interactive re-authentication behind the renewal prompt.
    async fn renew_manually(&self) -> Result<Session, AuthError>;
    async fn current_session(&self) -> Result<Option<Session>, AuthError>;
}
