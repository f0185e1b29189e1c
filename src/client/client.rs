use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::gate::*;
use crate::infra_memory::*;
use crate::logger::*;
use crate::settings::Settings;
use std::sync::Arc;
use std::time::Duration;

/// Everything a caller needs, wired from settings.
pub struct Client {
    pub auth_service: Arc<dyn AuthService>,
    pub interceptor: Arc<AuthInterceptor>,
    pub renewal_signal: Arc<RenewalSignal>,
}

impl Client {
    pub fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let session_store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let directory = Arc::new(MemoryUserDirectory::new(
            settings.directory.users.iter().cloned(),
        ));
        if directory.is_empty() {
            warn!("user directory is empty, nobody will be able to sign in");
        }
        let directory: Arc<dyn UserDirectory> = directory;

        let mut fake_provider: Option<Arc<FakeCredentialProvider>> = None;
        let provider: Arc<dyn CredentialProvider> = match settings.auth.backend.as_str() {
            "fake" => {
                let identity = settings
                    .auth
                    .fake
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("auth.fake section is required"))?;
                let fake = Arc::new(FakeCredentialProvider::new(
                    &identity.email,
                    &identity.display_name,
                ));
                fake_provider = Some(fake.clone());
                fake
            }
            "google" => {
                let google = settings
                    .auth
                    .google
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("auth.google section is required"))?;
                Arc::new(GoogleCredentialProvider::try_new(GoogleConfig {
                    client_id: google.client_id.clone(),
                    client_secret: google.client_secret.clone(),
                    refresh_token: google.refresh_token.clone(),
                    token_url: google.token_url.clone(),
                    userinfo_url: google.userinfo_url.clone(),
                    timeout: Duration::from_millis(settings.http.timeout_ms),
                })?)
            }
            other => return Err(anyhow::anyhow!("Unknown auth backend: {}", other)),
        };

        let transport: Arc<dyn HttpTransport> = match settings.http.backend.as_str() {
            "fake" => {
                let authority = fake_provider
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("fake http backend requires fake auth"))?;
                Arc::new(FakeTransport::new(authority).with_latency(Duration::from_millis(50)))
            }
            "http" => Arc::new(ReqwestTransport::try_new(
                &settings.http.base_url,
                Duration::from_millis(settings.http.timeout_ms),
            )?),
            other => return Err(anyhow::anyhow!("Unknown http backend: {}", other)),
        };

        let renewal_signal = Arc::new(RenewalSignal::new());
        let gate = Arc::new(RefreshGate::new(
            provider.clone(),
            session_store.clone(),
            renewal_signal.clone(),
            GateConfig {
                wait_window: Duration::from_millis(settings.gate.wait_window_ms),
                renewal_timeout: Duration::from_millis(settings.gate.renewal_timeout_ms),
            },
        ));
        let interceptor = Arc::new(AuthInterceptor::new(
            transport,
            session_store.clone(),
            gate,
            RetryPolicy {
                max_attempts: settings.gate.retry_attempts,
                base_delay: Duration::from_millis(settings.gate.retry_base_delay_ms),
                ..RetryPolicy::default()
            },
        ));

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            provider,
            directory,
            session_store,
        ));

        info!(
            "client ready (auth: {}, http: {})",
            settings.auth.backend, settings.http.backend
        );

        Ok(Self {
            auth_service,
            interceptor,
            renewal_signal,
        })
    }
}
