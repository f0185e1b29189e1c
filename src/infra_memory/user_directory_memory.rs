use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;

/// Registered users keyed by normalized email, loaded from settings rows.
pub struct MemoryUserDirectory {
    rows: DashMap<Email, DirectoryEntry>,
}

impl MemoryUserDirectory {
    pub fn new(entries: impl IntoIterator<Item = DirectoryEntry>) -> Self {
        let rows = DashMap::new();
        for entry in entries {
            let key = Email::new(&entry.email);
            if rows.insert(key.clone(), entry).is_some() {
                tracing::warn!("duplicate directory row for {}, keeping the last one", key);
            }
        }
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait::async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<DirectoryEntry>, DirectoryError> {
        Ok(self.rows.get(email).map(|row| row.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(email: &str, role: &str) -> DirectoryEntry {
        DirectoryEntry {
            email: email.to_string(),
            display_name: "Someone".to_string(),
            role: role.to_string(),
            active: true,
        }
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let directory = MemoryUserDirectory::new(vec![row("Ana@Example.com", "admin")]);
        let found = directory
            .find_by_email(&Email::new("ana@example.COM"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.role(), Role::Admin);
        assert!(
            directory
                .find_by_email(&Email::new("bob@example.com"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_duplicate_rows_keep_last() {
        let directory = MemoryUserDirectory::new(vec![
            row("ana@example.com", "player"),
            row("ANA@example.com", "manager"),
        ]);
        assert_eq!(directory.len(), 1);
        let entry = directory.rows.get(&Email::new("ana@example.com")).unwrap();
        assert_eq!(entry.role(), Role::Manager);
    }
}
