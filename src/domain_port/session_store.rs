use crate::domain_model::{Credential, Session};

/// Holds the one live session of this client.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self) -> Option<Session>;
    async fn put(&self, session: Session);
    /// Swap in a refreshed credential. Returns false if nobody is signed in.
    async fn update_credential(&self, credential: Credential) -> bool;
    async fn clear(&self) -> Option<Session>;
}
