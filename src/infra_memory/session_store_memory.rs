use crate::domain_model::*;
use crate::domain_port::*;
use tokio::sync::RwLock;

pub struct MemorySessionStore {
    slot: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self) -> Option<Session> {
        self.slot.read().await.clone()
    }

    async fn put(&self, session: Session) {
        *self.slot.write().await = Some(session);
    }

    async fn update_credential(&self, credential: Credential) -> bool {
        let mut slot = self.slot.write().await;
        match slot.as_mut() {
            Some(session) => {
                session.apply_refresh(credential);
                true
            }
            None => false,
        }
    }

    async fn clear(&self) -> Option<Session> {
        self.slot.write().await.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            email: Email::new("ana@example.com"),
            display_name: "Ana".to_string(),
            role: Role::Player,
        }
    }

    #[tokio::test]
    async fn test_update_credential_requires_session() {
        let store = MemorySessionStore::new();
        assert!(!store.update_credential(Credential::new("t2")).await);

        store.put(Session::new(Credential::new("t1"), identity())).await;
        assert!(store.update_credential(Credential::new("t2")).await);

        let session = store.get().await.unwrap();
        assert_eq!(session.credential.token.as_str(), "t2");
    }

    #[tokio::test]
    async fn test_clear_returns_previous() {
        let store = MemorySessionStore::new();
        store.put(Session::new(Credential::new("t1"), identity())).await;
        assert!(store.clear().await.is_some());
        assert!(store.get().await.is_none());
        assert!(store.clear().await.is_none());
    }
}
