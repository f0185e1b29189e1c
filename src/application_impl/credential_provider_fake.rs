use crate::application_port::*;
use crate::domain_model::*;
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// What the next `refresh_token` call should do.
#[derive(Debug, Clone)]
pub enum FakeRefresh {
    Issue,
    Fail(ProviderError),
    /// Never resolves.
    Hang,
}

/// In-process identity provider.
///
/// Issues `fake-access-token:<email>:<n>` tokens and remembers which one is
/// currently valid so [`FakeTransport`](super::FakeTransport) can act as the
/// resource server. Refresh outcomes are scripted; an empty script issues.
pub struct FakeCredentialProvider {
    email: String,
    display_name: String,
    refresh_delay: Duration,
    refresh_script: Mutex<VecDeque<FakeRefresh>>,
    sign_in_script: Mutex<VecDeque<ProviderError>>,
    valid_token: Mutex<Option<String>>,
    issued: AtomicUsize,
    refresh_calls: AtomicUsize,
}

impl FakeCredentialProvider {
    pub fn new(email: &str, display_name: &str) -> Self {
        Self {
            email: email.to_owned(),
            display_name: display_name.to_owned(),
            refresh_delay: Duration::ZERO,
            refresh_script: Mutex::new(VecDeque::new()),
            sign_in_script: Mutex::new(VecDeque::new()),
            valid_token: Mutex::new(None),
            issued: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    pub fn push_refresh(&self, step: FakeRefresh) {
        lock(&self.refresh_script).push_back(step);
    }

    pub fn fail_next_sign_in(&self, error: ProviderError) {
        lock(&self.sign_in_script).push_back(error);
    }

    /// Invalidates the current token as if it had expired server side.
    pub fn expire_current(&self) {
        lock(&self.valid_token).take();
    }

    pub fn is_valid(&self, token: &str) -> bool {
        lock(&self.valid_token).as_deref() == Some(token)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn issue(&self) -> Credential {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("fake-access-token:{}:{}", self.email, n);
        *lock(&self.valid_token) = Some(token.clone());
        Credential::new(token).with_expiry(Utc::now() + ChronoDuration::hours(1))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait::async_trait]
impl CredentialProvider for FakeCredentialProvider {
    async fn sign_in(&self) -> Result<SignInResult, ProviderError> {
        if let Some(error) = lock(&self.sign_in_script).pop_front() {
            return Err(error);
        }
        Ok(SignInResult {
            credential: self.issue(),
            email: self.email.clone(),
            display_name: Some(self.display_name.clone()),
        })
    }

    async fn refresh_token(&self) -> Result<Credential, ProviderError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let step = lock(&self.refresh_script)
            .pop_front()
            .unwrap_or(FakeRefresh::Issue);

        if !self.refresh_delay.is_zero() {
            tokio::time::sleep(self.refresh_delay).await;
        }

        match step {
            FakeRefresh::Issue => Ok(self.issue()),
            FakeRefresh::Fail(error) => Err(error),
            FakeRefresh::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refresh_rotates_valid_token() {
        let provider = FakeCredentialProvider::new("ana@example.com", "Ana");
        let first = provider.sign_in().await.unwrap().credential;
        assert!(provider.is_valid(first.token.as_str()));

        let second = provider.refresh_token().await.unwrap();
        assert_ne!(first.token, second.token);
        assert!(!provider.is_valid(first.token.as_str()));
        assert!(provider.is_valid(second.token.as_str()));
        assert_eq!(provider.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn test_scripted_failures_run_in_order() {
        let provider = FakeCredentialProvider::new("ana@example.com", "Ana");
        provider.push_refresh(FakeRefresh::Fail(ProviderError::PopupBlocked));
        provider.fail_next_sign_in(ProviderError::Cancelled);

        assert!(matches!(
            provider.refresh_token().await,
            Err(ProviderError::PopupBlocked)
        ));
        assert!(provider.refresh_token().await.is_ok());
        assert!(matches!(provider.sign_in().await, Err(ProviderError::Cancelled)));
        assert!(provider.sign_in().await.is_ok());
    }
}
