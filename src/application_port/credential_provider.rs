use crate::domain_model::Credential;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("sign-in popup was blocked")]
    PopupBlocked,
    #[error("sign-in was cancelled by the user")]
    Cancelled,
    #[error("grant is invalid or revoked")]
    InvalidGrant,
    #[error("provider did not answer in time")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("provider error: {0}")]
    Other(String),
}

#[derive(Debug, Clone)]
pub struct SignInResult {
    pub credential: Credential,
    pub email: String,
    pub display_name: Option<String>,
}

/// Identity provider that issues bearer credentials.
#[async_trait::async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Interactive sign-in.
    async fn sign_in(&self) -> Result<SignInResult, ProviderError>;
    /// Obtains a fresh credential for the current grant.
    async fn refresh_token(&self) -> Result<Credential, ProviderError>;
}
