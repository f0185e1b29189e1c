use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;

pub struct RealAuthService {
    provider: Arc<dyn CredentialProvider>,
    directory: Arc<dyn UserDirectory>,
    session_store: Arc<dyn SessionStore>,
}

impl RealAuthService {
    pub fn new(
        provider: Arc<dyn CredentialProvider>,
        directory: Arc<dyn UserDirectory>,
        session_store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            provider,
            directory,
            session_store,
        }
    }

    /// Interactive sign-in followed by the registered-user check.
    async fn authenticate(&self) -> Result<(Credential, Identity), AuthError> {
        let result = self.provider.sign_in().await?;
        let email = Email::new(&result.email);

        let entry = match self.directory.find_by_email(&email).await? {
            Some(entry) if entry.active => entry,
            Some(_) => {
                tracing::warn!("sign-in rejected, {} is inactive", email);
                return Err(AuthError::NotRegistered(email));
            }
            None => {
                tracing::warn!("sign-in rejected, {} is not in the directory", email);
                return Err(AuthError::NotRegistered(email));
            }
        };

        let display_name = result
            .display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| entry.display_name.clone());

        Ok((
            result.credential,
            Identity {
                email,
                display_name,
                role: entry.role(),
            },
        ))
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn sign_in(&self) -> Result<Session, AuthError> {
        let (credential, identity) = self.authenticate().await?;
        let session = Session::new(credential, identity);
        self.session_store.put(session.clone()).await;
        tracing::info!(
            "signed in {} as {} (session {})",
            session.identity.email,
            session.identity.role,
            session.id
        );
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(session) = self.session_store.clear().await {
            tracing::info!("signed out {} (session {})", session.identity.email, session.id);
        }
        Ok(())
    }

    async fn renew_manually(&self) -> Result<Session, AuthError> {
        let (credential, identity) = self.authenticate().await?;

        let session = match self.session_store.get().await {
            Some(mut current) if current.identity.email == identity.email => {
                current.apply_refresh(credential);
                current.identity = identity;
                current
            }
            Some(current) => {
                tracing::warn!(
                    "manual renewal switched account from {} to {}",
                    current.identity.email,
                    identity.email
                );
                Session::new(credential, identity)
            }
            None => Session::new(credential, identity),
        };

        self.session_store.put(session.clone()).await;
        tracing::info!("session {} renewed manually", session.id);
        Ok(session)
    }

    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.session_store.get().await)
    }
}
