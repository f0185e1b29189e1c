use crate::application_port::*;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

const SIGNAL_CAPACITY: usize = 16;

/// Broadcasts renewal-needed notices to every current subscriber.
///
/// Subscribers only see notices raised after they subscribed; nothing is
/// replayed. Publishing with nobody listening is not an error.
pub struct RenewalSignal {
    sender: broadcast::Sender<RenewalNotice>,
    fired: AtomicU64,
}

impl RenewalSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self {
            sender,
            fired: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RenewalNotice> {
        self.sender.subscribe()
    }

    /// Number of notices published since creation.
    pub fn fired(&self) -> u64 {
        self.fired.load(Ordering::SeqCst)
    }
}

impl Default for RenewalSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl RenewalListener for RenewalSignal {
    fn renewal_needed(&self, notice: RenewalNotice) {
        self.fired.fetch_add(1, Ordering::SeqCst);
        tracing::warn!("manual renewal needed: {}", notice.reason);
        if self.sender.send(notice).is_err() {
            tracing::debug!("no renewal subscribers");
        }
    }
}

/// Adapts a plain closure into a [`RenewalListener`].
pub struct CallbackListener {
    callback: Box<dyn Fn(RenewalNotice) + Send + Sync>,
}

impl CallbackListener {
    pub fn new(callback: impl Fn(RenewalNotice) + Send + Sync + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }
}

impl RenewalListener for CallbackListener {
    fn renewal_needed(&self, notice: RenewalNotice) {
        (self.callback)(notice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn test_all_subscribers_receive() {
        let signal = RenewalSignal::new();
        let mut a = signal.subscribe();
        let mut b = signal.subscribe();

        signal.renewal_needed(RenewalNotice::new(RenewalReason::PopupBlocked));

        assert_eq!(a.recv().await.unwrap().reason, RenewalReason::PopupBlocked);
        assert_eq!(b.recv().await.unwrap().reason, RenewalReason::PopupBlocked);
        assert_eq!(signal.fired(), 1);
    }

    #[tokio::test]
    async fn test_no_replay_to_late_subscribers() {
        let signal = RenewalSignal::new();
        signal.renewal_needed(RenewalNotice::new(RenewalReason::TimedOut));

        let mut late = signal.subscribe();
        assert!(matches!(
            late.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));

        signal.renewal_needed(RenewalNotice::new(RenewalReason::UserCancelled));
        assert_eq!(late.recv().await.unwrap().reason, RenewalReason::UserCancelled);
    }

    #[test]
    fn test_callback_listener() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let listener = CallbackListener::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        listener.renewal_needed(RenewalNotice::new(RenewalReason::TimedOut));
        listener.renewal_needed(RenewalNotice::new(RenewalReason::TimedOut));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
