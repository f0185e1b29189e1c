use cartola_session::application_impl::*;
use cartola_session::application_port::*;
use cartola_session::domain_model::*;
use cartola_session::domain_port::*;
use cartola_session::gate::*;
use cartola_session::infra_memory::*;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;

struct World {
    provider: Arc<FakeCredentialProvider>,
    transport: Arc<FakeTransport>,
    store: Arc<MemorySessionStore>,
    signal: Arc<RenewalSignal>,
    gate: Arc<RefreshGate>,
    interceptor: Arc<AuthInterceptor>,
    auth: RealAuthService,
}

async fn world(refresh_delay: Duration) -> World {
    let provider = Arc::new(
        FakeCredentialProvider::new("tecnico@cartola.dev", "Técnico")
            .with_refresh_delay(refresh_delay),
    );
    let transport = Arc::new(
        FakeTransport::new(provider.clone()).with_latency(Duration::from_millis(20)),
    );
    let store = Arc::new(MemorySessionStore::new());
    let directory = Arc::new(MemoryUserDirectory::new(vec![DirectoryEntry {
        email: "tecnico@cartola.dev".to_string(),
        display_name: "Técnico".to_string(),
        role: "admin".to_string(),
        active: true,
    }]));
    let signal = Arc::new(RenewalSignal::new());
    let gate = Arc::new(RefreshGate::new(
        provider.clone(),
        store.clone(),
        signal.clone(),
        GateConfig::default(),
    ));
    let interceptor = Arc::new(AuthInterceptor::new(
        transport.clone(),
        store.clone(),
        gate.clone(),
        RetryPolicy::default(),
    ));
    let auth = RealAuthService::new(provider.clone(), directory, store.clone());
    auth.sign_in().await.unwrap();

    World {
        provider,
        transport,
        store,
        signal,
        gate,
        interceptor,
        auth,
    }
}

async fn send_all(
    interceptor: &AuthInterceptor,
    paths: &[&str],
) -> Vec<Result<ApiResponse, ApiError>> {
    join_all(paths.iter().map(|p| interceptor.send(ApiRequest::get(*p)))).await
}

#[tokio::test(start_paused = true)]
async fn three_simultaneous_401s_share_one_renewal() {
    let w = world(Duration::from_millis(200)).await;
    let stale = w.store.get().await.unwrap().credential.token;
    w.provider.expire_current();

    let results = send_all(&w.interceptor, &["/api/teams", "/api/market", "/api/league"]).await;

    assert_eq!(w.provider.refresh_calls(), 1);
    for result in &results {
        assert_eq!(result.as_ref().unwrap().status, 200);
    }

    let fresh = w.store.get().await.unwrap().credential.token;
    assert_ne!(fresh, stale);
    let seen = w.transport.seen();
    assert_eq!(seen.len(), 6);
    assert!(seen[..3].iter().all(|(_, t)| t.as_ref() == Some(&stale)));
    assert!(seen[3..].iter().all(|(_, t)| t.as_ref() == Some(&fresh)));
    assert!(!w.gate.is_refreshing());
    assert_eq!(w.signal.fired(), 0);
}

#[tokio::test(start_paused = true)]
async fn popup_blocked_fails_every_waiter_and_prompts() {
    let w = world(Duration::from_millis(200)).await;
    let mut notices = w.signal.subscribe();
    w.provider.expire_current();
    w.provider
        .push_refresh(FakeRefresh::Fail(ProviderError::PopupBlocked));

    let results = send_all(&w.interceptor, &["/api/teams", "/api/market", "/api/league"]).await;

    for result in results {
        assert!(matches!(
            result,
            Err(ApiError::RenewalNeeded(RenewalReason::PopupBlocked))
        ));
    }
    assert_eq!(w.provider.refresh_calls(), 1);
    assert_eq!(w.signal.fired(), 1);

    let notice = notices.recv().await.unwrap();
    let prompt = RenewalPrompt::from(&notice.reason);
    assert!(prompt.body.contains("blocked the sign-in popup"));

    // the user is still signed in and can renew from the prompt
    assert!(w.store.get().await.is_some());
    w.auth.renew_manually().await.unwrap();
    let response = w.interceptor.send(ApiRequest::get("/api/teams")).await.unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test(start_paused = true)]
async fn waiters_time_out_when_renewal_never_finishes() {
    let w = world(Duration::ZERO).await;
    w.provider.expire_current();
    w.provider.push_refresh(FakeRefresh::Hang);

    let started = tokio::time::Instant::now();
    let results = send_all(&w.interceptor, &["/api/teams", "/api/market"]).await;

    assert!(started.elapsed() >= Duration::from_secs(10));
    for result in results {
        assert!(matches!(
            result,
            Err(ApiError::RenewalNeeded(RenewalReason::TimedOut))
        ));
    }
    assert_eq!(w.provider.refresh_calls(), 1);
    assert_eq!(w.signal.fired(), 1);
}

#[tokio::test(start_paused = true)]
async fn late_arrival_after_renewal_reuses_new_token() {
    let w = world(Duration::from_millis(50)).await;
    let stale = w.store.get().await.unwrap().credential.token;
    w.provider.expire_current();

    w.interceptor.send(ApiRequest::get("/api/teams")).await.unwrap();
    assert_eq!(w.provider.refresh_calls(), 1);

    // a 401 for a request sent with the old token arrives after the renewal
    let token = w.gate.fresh_token(Some(&stale)).await.unwrap();
    assert_eq!(token, w.store.get().await.unwrap().credential.token);
    assert_eq!(w.provider.refresh_calls(), 1);
}
