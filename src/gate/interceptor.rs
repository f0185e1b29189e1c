use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::gate::{RefreshGate, RetryPolicy};
use nanoid::nanoid;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Attaches the session's bearer token to outgoing requests and recovers
/// from `401` through the [`RefreshGate`].
///
/// Only the first `401` of a request goes through the gate. The replay
/// with the renewed token is retried with backoff on transient failures,
/// but a second `401` is returned as [`ApiError::Unauthorized`].
pub struct AuthInterceptor {
    transport: Arc<dyn HttpTransport>,
    session_store: Arc<dyn SessionStore>,
    gate: Arc<RefreshGate>,
    retry: RetryPolicy,
}

impl AuthInterceptor {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        session_store: Arc<dyn SessionStore>,
        gate: Arc<RefreshGate>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            session_store,
            gate,
            retry,
        }
    }

    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let request_id = nanoid!(8);
        let token = self
            .session_store
            .get()
            .await
            .map(|session| session.credential.token);

        let outgoing = match &token {
            Some(token) => request.clone().with_bearer(token),
            None => request.clone(),
        };
        tracing::debug!("[{}] {} {}", request_id, request.method, request.path);
        let response = self.transport.send(outgoing).await?;

        if response.status != 401 {
            return classify(response);
        }
        let Some(token) = token else {
            return Err(ApiError::NotSignedIn);
        };

        tracing::info!(
            "[{}] {} {} unauthorized, waiting for renewal",
            request_id,
            request.method,
            request.path
        );
        let fresh = self
            .gate
            .fresh_token(Some(&token))
            .await
            .map_err(ApiError::RenewalNeeded)?;

        self.replay(&request_id, request.with_bearer(&fresh)).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(ApiRequest::get(path)).await?;
        response
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn replay(&self, request_id: &str, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut attempt = 0;
        loop {
            let result = match self.transport.send(request.clone()).await {
                Ok(response) => classify(response),
                Err(e) => Err(ApiError::from(e)),
            };

            match result {
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    attempt += 1;
                    tracing::warn!(
                        "[{}] replay failed ({}), retry {}/{} in {:?}",
                        request_id,
                        e,
                        attempt,
                        self.retry.max_attempts,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }
}

fn classify(response: ApiResponse) -> Result<ApiResponse, ApiError> {
    match response.status {
        _ if response.is_success() => Ok(response),
        401 => Err(ApiError::Unauthorized),
        403 => Err(ApiError::Forbidden),
        status => Err(ApiError::Status {
            status,
            body: response.body,
        }),
    }
}
