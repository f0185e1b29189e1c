use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;

pub type RenewalOutcome = Result<BearerToken, RenewalReason>;

#[derive(Debug, Clone)]
pub struct GateConfig {
    /// How long one caller waits for a shared renewal before giving up.
    pub wait_window: Duration,
    /// Upper bound on the renewal call as seen by the gate.
    pub renewal_timeout: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            wait_window: Duration::from_secs(10),
            renewal_timeout: Duration::from_secs(10),
        }
    }
}

struct Cycle {
    id: u64,
    rejected: Option<BearerToken>,
    waiters: Vec<oneshot::Sender<RenewalOutcome>>,
    signaled: Arc<AtomicBool>,
}

enum GateState {
    Idle,
    Refreshing(Cycle),
}

struct GateSlot {
    phase: GateState,
    /// Token the last successful cycle replaced, and the one it issued.
    last_renewal: Option<(BearerToken, BearerToken)>,
}

struct GateInner {
    state: Mutex<GateSlot>,
    next_cycle: AtomicU64,
    provider: Arc<dyn CredentialProvider>,
    session_store: Arc<dyn SessionStore>,
    listener: Arc<dyn RenewalListener>,
    config: GateConfig,
}

impl GateInner {
    fn lock_state(&self) -> MutexGuard<'_, GateSlot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Raises the manual renewal signal at most once per cycle.
    fn raise(&self, signaled: &AtomicBool, reason: RenewalReason) {
        if !signaled.swap(true, Ordering::SeqCst) {
            self.listener.renewal_needed(RenewalNotice::new(reason));
        }
    }

    fn settle(&self, cycle_id: u64, outcome: RenewalOutcome) {
        let cycle = {
            let mut slot = self.lock_state();
            match std::mem::replace(&mut slot.phase, GateState::Idle) {
                GateState::Refreshing(cycle) if cycle.id == cycle_id => {
                    if let (Ok(issued), Some(rejected)) = (&outcome, &cycle.rejected) {
                        slot.last_renewal = Some((rejected.clone(), issued.clone()));
                    }
                    cycle
                }
                other => {
                    slot.phase = other;
                    return;
                }
            }
        };

        match &outcome {
            Ok(_) => tracing::info!(
                "renewal cycle {} succeeded, releasing {} waiter(s)",
                cycle_id,
                cycle.waiters.len()
            ),
            Err(reason) => {
                tracing::warn!(
                    "renewal cycle {} failed ({}), releasing {} waiter(s)",
                    cycle_id,
                    reason,
                    cycle.waiters.len()
                );
                self.raise(&cycle.signaled, reason.clone());
            }
        }

        for waiter in cycle.waiters {
            // receiver is gone when that waiter already timed out
            let _ = waiter.send(outcome.clone());
        }
    }
}

/// Resets the gate to `Idle` on every exit path of a renewal cycle,
/// including a panic or an aborted driver task.
struct CycleGuard {
    inner: Arc<GateInner>,
    cycle_id: u64,
    settled: bool,
}

impl CycleGuard {
    fn settle(mut self, outcome: RenewalOutcome) {
        self.settled = true;
        self.inner.settle(self.cycle_id, outcome);
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        if !self.settled {
            tracing::error!("renewal cycle {} ended without an outcome", self.cycle_id);
            self.inner.settle(
                self.cycle_id,
                Err(RenewalReason::Failed("renewal aborted".to_string())),
            );
        }
    }
}

/// Single-flight token renewal.
///
/// The first caller that needs a fresh credential starts a renewal; callers
/// arriving while it runs attach as waiters and get the same outcome, in the
/// order they attached. When renewal fails, or a waiter's window runs out,
/// the [`RenewalListener`] is told once for that cycle.
pub struct RefreshGate {
    inner: Arc<GateInner>,
    renewals_started: AtomicU64,
}

impl RefreshGate {
    pub fn new(
        provider: Arc<dyn CredentialProvider>,
        session_store: Arc<dyn SessionStore>,
        listener: Arc<dyn RenewalListener>,
        config: GateConfig,
    ) -> Self {
        Self {
            inner: Arc::new(GateInner {
                state: Mutex::new(GateSlot {
                    phase: GateState::Idle,
                    last_renewal: None,
                }),
                next_cycle: AtomicU64::new(1),
                provider,
                session_store,
                listener,
                config,
            }),
            renewals_started: AtomicU64::new(0),
        }
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(self.inner.lock_state().phase, GateState::Refreshing(_))
    }

    pub fn renewals_started(&self) -> u64 {
        self.renewals_started.load(Ordering::SeqCst)
    }

    /// Returns a credential newer than `rejected`.
    ///
    /// If the session already holds a different token (a renewal finished
    /// after `rejected` was sent) it is returned without starting another one.
    /// The same check is repeated under the gate lock against the last
    /// renewal, which closes the gap between reading the session and
    /// finding the gate idle.
    pub async fn fresh_token(&self, rejected: Option<&BearerToken>) -> RenewalOutcome {
        if let Some(rejected) = rejected {
            if let Some(session) = self.inner.session_store.get().await {
                if &session.credential.token != rejected {
                    tracing::debug!("rejected token is stale, reusing current session token");
                    return Ok(session.credential.token);
                }
            }
        }

        let (tx, rx) = oneshot::channel();
        let (cycle_id, signaled, leader) = {
            let mut guard = self.inner.lock_state();
            let slot = &mut *guard;
            match &mut slot.phase {
                GateState::Refreshing(cycle) => {
                    cycle.waiters.push(tx);
                    tracing::debug!(
                        "attached to renewal cycle {} as waiter #{}",
                        cycle.id,
                        cycle.waiters.len()
                    );
                    (cycle.id, cycle.signaled.clone(), false)
                }
                GateState::Idle => {
                    if let (Some(rejected), Some((replaced, issued))) =
                        (rejected, &slot.last_renewal)
                    {
                        if replaced == rejected {
                            tracing::debug!("renewal for this token already finished");
                            return Ok(issued.clone());
                        }
                    }
                    let id = self.inner.next_cycle.fetch_add(1, Ordering::SeqCst);
                    let signaled = Arc::new(AtomicBool::new(false));
                    slot.phase = GateState::Refreshing(Cycle {
                        id,
                        rejected: rejected.cloned(),
                        waiters: vec![tx],
                        signaled: signaled.clone(),
                    });
                    (id, signaled, true)
                }
            }
        };

        if leader {
            self.renewals_started.fetch_add(1, Ordering::SeqCst);
            tracing::info!("renewal cycle {} started", cycle_id);
            tokio::spawn(drive_cycle(self.inner.clone(), cycle_id));
        }

        match tokio::time::timeout(self.inner.config.wait_window, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(RenewalReason::Failed("renewal abandoned".to_string())),
            Err(_) => {
                tracing::warn!(
                    "gave up waiting for renewal cycle {} after {:?}",
                    cycle_id,
                    self.inner.config.wait_window
                );
                self.inner.raise(&signaled, RenewalReason::TimedOut);
                Err(RenewalReason::TimedOut)
            }
        }
    }
}

async fn drive_cycle(inner: Arc<GateInner>, cycle_id: u64) {
    let guard = CycleGuard {
        inner: inner.clone(),
        cycle_id,
        settled: false,
    };

    let provider = inner.provider.clone();
    let store = inner.session_store.clone();
    // Not cancelled by the timeout below; a late success still lands in the session.
    let renewal = tokio::spawn(async move {
        let result = provider.refresh_token().await;
        match &result {
            Ok(credential) => {
                if !store.update_credential(credential.clone()).await {
                    tracing::debug!("renewed credential with nobody signed in");
                }
            }
            Err(ProviderError::InvalidGrant) => {
                if let Some(session) = store.clear().await {
                    tracing::warn!("grant revoked, session {} destroyed", session.id);
                }
            }
            Err(_) => {}
        }
        result
    });

    let outcome = match tokio::time::timeout(inner.config.renewal_timeout, renewal).await {
        Ok(Ok(Ok(credential))) => Ok(credential.token),
        Ok(Ok(Err(error))) => Err(RenewalReason::from(error)),
        Ok(Err(join_error)) => Err(RenewalReason::Failed(format!(
            "renewal task failed: {join_error}"
        ))),
        Err(_) => Err(RenewalReason::TimedOut),
    };

    guard.settle(outcome);
}
