use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::{PlaygroundApi, PlaygroundUser};
use crate::reconcile::probe::Probe;
use crate::reconcile::reconciler::{Reconciler, Step};
use crate::reconcile::types::ViewState;

/// Running readiness check of one instance.
///
/// Publishes every state the reconciler passes through. Dropping the handle
/// cancels any pending retry.
pub struct InstanceWatch {
    rx: watch::Receiver<ViewState>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl InstanceWatch {
    pub fn state(&self) -> ViewState {
        self.rx.borrow().clone()
    }

    /// Wait for the next published state. `None` once the check has stopped.
    pub async fn changed(&mut self) -> Option<ViewState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Wait until the state is terminal, or the check stops without resolving
    /// (no subject), in which case the last state is returned.
    pub async fn resolved(&mut self) -> ViewState {
        if let Ok(state) = self.rx.wait_for(ViewState::is_terminal).await {
            return state.clone();
        }
        self.rx.borrow().clone()
    }

    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!(event = "core.reconcile.join_failed", error = %e);
        }
    }
}

impl Drop for InstanceWatch {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Drive `reconciler` until it reaches a terminal state or is cancelled.
///
/// Checks are sequential; the next one starts the retry delay after the
/// previous one finished.
pub fn watch_instance<A, P>(
    api: Arc<A>,
    probe: P,
    subject: Option<PlaygroundUser>,
    mut reconciler: Reconciler,
) -> InstanceWatch
where
    A: PlaygroundApi + 'static,
    P: Probe + 'static,
{
    let (tx, rx) = watch::channel(reconciler.state().clone());
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        loop {
            let step = tokio::select! {
                _ = token.cancelled() => break,
                step = reconciler.check(subject.as_ref(), api.as_ref(), &probe) => step,
            };
            tx.send_replace(reconciler.state().clone());

            let delay = match step {
                Step::Idle | Step::Resolved => break,
                Step::RetryAfter(delay) => delay,
            };
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        debug!(
            event = "core.reconcile.stopped",
            retry = reconciler.budget().used(),
            terminal = reconciler.state().is_terminal()
        );
    });

    InstanceWatch {
        rx,
        cancel,
        task: Some(task),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::api::{Instance, InstanceDetails};
    use crate::reconcile::recovery::RecoveryAction;
    use crate::reconcile::types::InstanceFailure;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    struct Unreachable;

    impl Probe for Unreachable {
        async fn is_reachable(&self, _url: &str) -> bool {
            false
        }
    }

    fn alice() -> PlaygroundUser {
        PlaygroundUser {
            id: "alice".to_string(),
            admin: true,
            can_customize_duration: true,
        }
    }

    fn unresolved_instance() -> InstanceDetails {
        InstanceDetails {
            user: Some(alice()),
            instance: Some(Instance {
                url: "https://alice.playground.test".to_string(),
                pod: None,
            }),
        }
    }

    fn reconciler(max: u32) -> Reconciler {
        Reconciler::new(max, Duration::from_secs(1), RecoveryAction::new("noop", || {}))
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_after_budget_of_ticks() {
        let api = Arc::new(FakeApi::default());
        api.push_details(Ok(unresolved_instance()));

        let start = tokio::time::Instant::now();
        let mut watch = watch_instance(api.clone(), Unreachable, Some(alice()), reconciler(3));
        let state = watch.resolved().await;

        assert!(matches!(
            state,
            ViewState::Error {
                failure: InstanceFailure::Timeout,
                ..
            }
        ));
        // Three retries, each one delay apart, then the exhausted check.
        assert_eq!(api.details_calls.load(Ordering::SeqCst), 4);
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_subject_stays_loading() {
        let api = Arc::new(FakeApi::default());
        let mut watch = watch_instance(api.clone(), Unreachable, None, reconciler(3));

        let state = watch.resolved().await;
        assert!(matches!(state, ViewState::Loading { retry: 0, .. }));
        assert_eq!(api.details_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_retry() {
        let api = Arc::new(FakeApi::default());
        api.push_details(Ok(unresolved_instance()));
        let mut watch = watch_instance(api.clone(), Unreachable, Some(alice()), reconciler(300));

        let first = watch.changed().await;
        assert!(matches!(first, Some(ViewState::Loading { retry: 1, .. })));
        drop(watch);

        let calls = api.details_calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(api.details_calls.load(Ordering::SeqCst), calls);
    }
}
