use crate::application_impl::FakeCredentialProvider;
use crate::application_port::*;
use crate::domain_model::*;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum FakeReply {
    Status(u16, String),
    Timeout,
    Network(String),
}

/// In-memory resource server. A request is authorized only when it carries
/// the token the [`FakeCredentialProvider`] currently considers valid; after
/// that, scripted replies for the path are served in order, then `200`.
pub struct FakeTransport {
    authority: Arc<FakeCredentialProvider>,
    latency: Duration,
    scripts: DashMap<String, VecDeque<FakeReply>>,
    seen: Mutex<Vec<(String, Option<BearerToken>)>>,
    sent: AtomicUsize,
}

impl FakeTransport {
    pub fn new(authority: Arc<FakeCredentialProvider>) -> Self {
        Self {
            authority,
            latency: Duration::ZERO,
            scripts: DashMap::new(),
            seen: Mutex::new(Vec::new()),
            sent: AtomicUsize::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn script(&self, path: &str, reply: FakeReply) {
        self.scripts
            .entry(path.to_owned())
            .or_default()
            .push_back(reply);
    }

    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    /// Path and bearer of every request received, in arrival order.
    pub fn seen(&self) -> Vec<(String, Option<BearerToken>)> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn next_scripted(&self, path: &str) -> Option<FakeReply> {
        self.scripts.get_mut(path)?.pop_front()
    }
}

#[async_trait::async_trait]
impl HttpTransport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        let bearer = request.bearer();
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((request.path.clone(), bearer.clone()));

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let authorized = bearer
            .as_ref()
            .map(|t| self.authority.is_valid(t.as_str()))
            .unwrap_or(false);
        if !authorized {
            return Ok(ApiResponse::new(401, r#"{"error":"unauthorized"}"#));
        }

        match self.next_scripted(&request.path) {
            Some(FakeReply::Status(status, body)) => Ok(ApiResponse::new(status, body)),
            Some(FakeReply::Timeout) => Err(TransportError::Timeout),
            Some(FakeReply::Network(e)) => Err(TransportError::Network(e)),
            None => Ok(ApiResponse::new(
                200,
                serde_json::json!({ "method": request.method.to_string(), "path": request.path })
                    .to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_stale_token() {
        let provider = Arc::new(FakeCredentialProvider::new("ana@example.com", "Ana"));
        let token = provider.sign_in().await.unwrap().credential.token;
        let transport = FakeTransport::new(provider.clone());

        let ok = transport
            .send(ApiRequest::get("/api/teams").with_bearer(&token))
            .await
            .unwrap();
        assert_eq!(ok.status, 200);

        provider.expire_current();
        let denied = transport
            .send(ApiRequest::get("/api/teams").with_bearer(&token))
            .await
            .unwrap();
        assert_eq!(denied.status, 401);

        let anonymous = transport.send(ApiRequest::get("/api/teams")).await.unwrap();
        assert_eq!(anonymous.status, 401);
        assert_eq!(transport.sent(), 3);
    }

    #[tokio::test]
    async fn test_scripted_replies_then_default() {
        let provider = Arc::new(FakeCredentialProvider::new("ana@example.com", "Ana"));
        let token = provider.sign_in().await.unwrap().credential.token;
        let transport = FakeTransport::new(provider);
        transport.script("/api/market", FakeReply::Status(503, "down".to_string()));
        transport.script("/api/market", FakeReply::Timeout);

        let request = ApiRequest::get("/api/market").with_bearer(&token);
        assert_eq!(transport.send(request.clone()).await.unwrap().status, 503);
        assert!(matches!(
            transport.send(request.clone()).await,
            Err(TransportError::Timeout)
        ));
        assert_eq!(transport.send(request).await.unwrap().status, 200);
    }
}
