//! Walks the refresh gate through its two headline scenarios on fake
//! backends: three simultaneous 401s sharing one renewal, then a renewal
//! that fails because the sign-in popup was blocked.

use cartola_session::application_impl::*;
use cartola_session::application_port::*;
use cartola_session::domain_model::*;
use cartola_session::domain_port::*;
use cartola_session::gate::*;
use cartola_session::infra_memory::*;
use cartola_session::logger::*;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap();
    logger.reload_from_config(&LogConfig {
        filter: "debug".to_string(),
    })?;

    let provider = Arc::new(
        FakeCredentialProvider::new("tecnico@cartola.dev", "Técnico")
            .with_refresh_delay(Duration::from_millis(300)),
    );
    let transport = Arc::new(FakeTransport::new(provider.clone()).with_latency(Duration::from_millis(20)));
    let session_store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let directory: Arc<dyn UserDirectory> = Arc::new(MemoryUserDirectory::new(vec![DirectoryEntry {
        email: "tecnico@cartola.dev".to_string(),
        display_name: "Técnico".to_string(),
        role: "manager".to_string(),
        active: true,
    }]));

    let signal = Arc::new(RenewalSignal::new());
    let mut notices = signal.subscribe();
    let gate = Arc::new(RefreshGate::new(
        provider.clone(),
        session_store.clone(),
        signal.clone(),
        GateConfig::default(),
    ));
    let interceptor = AuthInterceptor::new(
        transport.clone(),
        session_store.clone(),
        gate.clone(),
        RetryPolicy::default(),
    );
    let auth_service = RealAuthService::new(provider.clone(), directory, session_store.clone());

    auth_service.sign_in().await?;

    // scenario 1
    provider.expire_current();
    let paths = ["/api/teams", "/api/market", "/api/league"];
    let results = join_all(paths.iter().map(|p| interceptor.send(ApiRequest::get(*p)))).await;
    for (path, result) in paths.iter().zip(&results) {
        info!("{} -> {:?}", path, result.as_ref().map(|r| r.status));
    }
    info!(
        "renewal calls: {}, requests sent: {}",
        provider.refresh_calls(),
        transport.sent()
    );

    // scenario 2
    provider.expire_current();
    provider.push_refresh(FakeRefresh::Fail(ProviderError::PopupBlocked));
    let results = join_all(paths.iter().map(|p| interceptor.send(ApiRequest::get(*p)))).await;
    for (path, result) in paths.iter().zip(&results) {
        info!("{} -> {:?}", path, result.as_ref().map(|r| r.status));
    }
    let notice = notices.recv().await?;
    println!("{}", RenewalPrompt::from(&notice.reason));

    let session = auth_service.renew_manually().await?;
    info!("renewed manually, session {}", session.id);
    let response = interceptor.send(ApiRequest::get("/api/teams")).await?;
    info!("after manual renewal: {}", response.status);

    Ok(())
}
