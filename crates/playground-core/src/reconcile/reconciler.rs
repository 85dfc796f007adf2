use std::time::Duration;

use tracing::{debug, info, warn};

use crate::api::{ApiResult, InstanceDetails, Phase, PlaygroundApi, PlaygroundUser};
use crate::config::PlaygroundConfig;
use crate::reconcile::probe::Probe;
use crate::reconcile::recovery::RecoveryAction;
use crate::reconcile::types::{InstanceFailure, RetryBudget, ViewState};

/// Container waiting reasons that mean the instance will never come up.
pub const CRASH_REASONS: [&str; 4] = [
    "CrashLoopBackOff",
    "ErrImagePull",
    "ImagePullBackOff",
    "InvalidImageName",
];

pub const NOT_FOUND_MESSAGE: &str = "Couldn't locate the instance";
pub const TIMEOUT_MESSAGE: &str = "Couldn't access the instance in time";

/// Outcome of one [`Reconciler::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing was evaluated: no subject, or the state is already terminal.
    Idle,
    /// The state just became terminal.
    Resolved,
    /// Still loading; check again after the delay.
    RetryAfter(Duration),
}

/// What one details fetch says about the instance.
enum Observation<'a> {
    Missing,
    Crashed { reason: String },
    Probe { url: &'a str, phase: Phase },
    Unresolved { phase: Option<Phase> },
}

fn observe(details: &ApiResult<InstanceDetails>) -> Observation<'_> {
    let details = match details {
        Ok(details) => details,
        Err(e) => {
            warn!(event = "core.reconcile.details_failed", error = %e);
            return Observation::Unresolved { phase: None };
        }
    };
    let Some(instance) = details.instance.as_ref() else {
        return Observation::Missing;
    };
    let phase = instance.phase();
    match phase {
        Some(phase) if phase.is_active() => {
            if let Some(waiting) = instance.first_waiting()
                && let Some(reason) = waiting.reason.as_deref()
                && CRASH_REASONS.contains(&reason)
            {
                let reason = waiting.message.clone().unwrap_or_else(|| reason.to_string());
                return Observation::Crashed { reason };
            }
            Observation::Probe {
                url: &instance.url,
                phase,
            }
        }
        _ => Observation::Unresolved { phase },
    }
}

/// Instance readiness state machine.
///
/// Starts in `Loading` and moves to `Success` or `Error` exactly once. Every
/// error carries the same recovery action; the machine never retries out of
/// a terminal state by itself.
#[derive(Debug)]
pub struct Reconciler {
    state: ViewState,
    budget: RetryBudget,
    retry_delay: Duration,
    recovery: RecoveryAction,
}

impl Reconciler {
    pub fn new(max_retries: u32, retry_delay: Duration, recovery: RecoveryAction) -> Self {
        Self {
            state: ViewState::initial(),
            budget: RetryBudget::new(max_retries),
            retry_delay,
            recovery,
        }
    }

    pub fn from_config(config: &PlaygroundConfig, recovery: RecoveryAction) -> Self {
        Self::new(config.max_retries(), config.retry_delay(), recovery)
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn budget(&self) -> RetryBudget {
        self.budget
    }

    /// Evaluate the instance once.
    pub async fn check<A, P>(
        &mut self,
        subject: Option<&PlaygroundUser>,
        api: &A,
        probe: &P,
    ) -> Step
    where
        A: PlaygroundApi,
        P: Probe,
    {
        if subject.is_none() || self.state.is_terminal() {
            return Step::Idle;
        }

        let details = api.get_details().await;
        match observe(&details) {
            Observation::Missing => self.fail(InstanceFailure::NotFound, NOT_FOUND_MESSAGE),
            Observation::Crashed { reason } => self.fail(
                InstanceFailure::CrashDetected {
                    reason: reason.clone(),
                },
                reason,
            ),
            Observation::Probe { url, phase } => {
                if probe.is_reachable(url).await {
                    info!(event = "core.reconcile.ready", url = url);
                    self.state = ViewState::Success {
                        url: url.to_string(),
                    };
                    Step::Resolved
                } else {
                    self.unresolved(Some(phase))
                }
            }
            Observation::Unresolved { phase } => self.unresolved(phase),
        }
    }

    fn unresolved(&mut self, phase: Option<Phase>) -> Step {
        if !self.budget.try_consume() {
            return self.fail(InstanceFailure::Timeout, TIMEOUT_MESSAGE);
        }
        debug!(
            event = "core.reconcile.retry_scheduled",
            retry = self.budget.used(),
            max = self.budget.max()
        );
        self.state = ViewState::Loading {
            phase,
            retry: self.budget.used(),
        };
        Step::RetryAfter(self.retry_delay)
    }

    fn fail(&mut self, failure: InstanceFailure, reason: impl Into<String>) -> Step {
        let reason = reason.into();
        warn!(
            event = "core.reconcile.failed",
            code = failure.code(),
            reason = reason.as_str(),
            retry = self.budget.used()
        );
        self.state = ViewState::Error {
            failure,
            reason,
            action: self.recovery.clone(),
        };
        Step::Resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::api::{
        ApiError, ContainerState, ContainerStateWaiting, ContainerStatus, Instance, InstancePod,
        PodDetails, PodStatus,
    };
    use crate::reconcile::recovery::LifecycleCommand;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    struct StaticProbe {
        reachable: bool,
        calls: AtomicUsize,
    }

    impl StaticProbe {
        fn new(reachable: bool) -> Self {
            Self {
                reachable,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Probe for StaticProbe {
        async fn is_reachable(&self, _url: &str) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reachable
        }
    }

    fn subject() -> PlaygroundUser {
        PlaygroundUser {
            id: "alice".to_string(),
            admin: false,
            can_customize_duration: false,
        }
    }

    fn instance(phase: Phase, waiting_reason: Option<&str>) -> InstanceDetails {
        let waiting = waiting_reason.map(|reason| ContainerStateWaiting {
            reason: Some(reason.to_string()),
            message: Some(format!("container is in {reason}")),
        });
        InstanceDetails {
            user: Some(subject()),
            instance: Some(Instance {
                url: "https://alice.playground.test".to_string(),
                pod: Some(InstancePod {
                    details: Some(PodDetails {
                        status: Some(PodStatus {
                            phase: Some(phase),
                            container_statuses: Some(vec![ContainerStatus {
                                state: Some(ContainerState { waiting }),
                            }]),
                        }),
                    }),
                }),
            }),
        }
    }

    fn reconciler(max: u32) -> (Reconciler, mpsc::UnboundedReceiver<LifecycleCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let reconciler = Reconciler::new(max, Duration::from_secs(1), RecoveryAction::restart(tx));
        (reconciler, rx)
    }

    #[tokio::test]
    async fn test_no_subject_is_idle() {
        let api = FakeApi::default();
        let (mut reconciler, _rx) = reconciler(300);

        let step = reconciler.check(None, &api, &StaticProbe::new(true)).await;
        assert_eq!(step, Step::Idle);
        assert_eq!(api.details_calls.load(Ordering::SeqCst), 0);
        assert_eq!(reconciler.state().retry(), Some(0));
    }

    #[tokio::test]
    async fn test_missing_instance_is_not_found() {
        let api = FakeApi::default();
        let (mut reconciler, mut rx) = reconciler(300);

        let step = reconciler
            .check(Some(&subject()), &api, &StaticProbe::new(true))
            .await;
        assert_eq!(step, Step::Resolved);
        let ViewState::Error {
            failure,
            reason,
            action,
        } = reconciler.state()
        else {
            panic!("expected error, got {:?}", reconciler.state());
        };
        assert_eq!(*failure, InstanceFailure::NotFound);
        assert_eq!(reason, NOT_FOUND_MESSAGE);

        action.invoke();
        assert_eq!(rx.try_recv().unwrap(), LifecycleCommand::Restart);
    }

    #[tokio::test]
    async fn test_crash_loop_fails_regardless_of_retry_count() {
        let api = FakeApi::default();
        api.push_details(Ok(instance(Phase::Pending, None)));
        api.push_details(Ok(instance(Phase::Pending, None)));
        api.push_details(Ok(instance(Phase::Running, Some("CrashLoopBackOff"))));
        let probe = StaticProbe::new(false);
        let (mut reconciler, _rx) = reconciler(300);

        let user = subject();
        assert!(matches!(
            reconciler.check(Some(&user), &api, &probe).await,
            Step::RetryAfter(_)
        ));
        assert!(matches!(
            reconciler.check(Some(&user), &api, &probe).await,
            Step::RetryAfter(_)
        ));
        assert_eq!(reconciler.budget().used(), 2);

        assert_eq!(
            reconciler.check(Some(&user), &api, &probe).await,
            Step::Resolved
        );
        let ViewState::Error { failure, reason, .. } = reconciler.state() else {
            panic!("expected error, got {:?}", reconciler.state());
        };
        assert!(matches!(failure, InstanceFailure::CrashDetected { .. }));
        assert_eq!(reason, "container is in CrashLoopBackOff");
        // Crash short-circuits before probing.
        assert_eq!(probe.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_crash_reason_ignored_outside_active_phase() {
        let api = FakeApi::default();
        api.push_details(Ok(instance(Phase::Failed, Some("ErrImagePull"))));
        let (mut reconciler, _rx) = reconciler(300);

        let step = reconciler
            .check(Some(&subject()), &api, &StaticProbe::new(true))
            .await;
        assert_eq!(step, Step::RetryAfter(Duration::from_secs(1)));
        assert!(matches!(
            reconciler.state(),
            ViewState::Loading {
                phase: Some(Phase::Failed),
                retry: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_reachable_instance_succeeds_and_stays_terminal() {
        let api = FakeApi::default();
        api.push_details(Ok(instance(Phase::Running, None)));
        let probe = StaticProbe::new(true);
        let (mut reconciler, _rx) = reconciler(300);

        let user = subject();
        assert_eq!(
            reconciler.check(Some(&user), &api, &probe).await,
            Step::Resolved
        );
        assert!(matches!(
            reconciler.state(),
            ViewState::Success { url } if url == "https://alice.playground.test"
        ));

        assert_eq!(reconciler.check(Some(&user), &api, &probe).await, Step::Idle);
        assert_eq!(api.details_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_increments_then_times_out_exactly_at_max() {
        let api = FakeApi::default();
        api.push_details(Ok(instance(Phase::Running, None)));
        let probe = StaticProbe::new(false);
        let (mut reconciler, _rx) = reconciler(300);

        let user = subject();
        for expected in 1..=300 {
            let step = reconciler.check(Some(&user), &api, &probe).await;
            assert_eq!(step, Step::RetryAfter(Duration::from_secs(1)));
            assert_eq!(reconciler.state().retry(), Some(expected));
        }

        assert_eq!(
            reconciler.check(Some(&user), &api, &probe).await,
            Step::Resolved
        );
        let ViewState::Error { failure, reason, .. } = reconciler.state() else {
            panic!("expected timeout, got {:?}", reconciler.state());
        };
        assert_eq!(*failure, InstanceFailure::Timeout);
        assert_eq!(reason, TIMEOUT_MESSAGE);
        assert_eq!(reconciler.budget().used(), 300);
    }

    #[tokio::test]
    async fn test_failed_details_fetch_counts_as_unreachable() {
        let api = FakeApi::default();
        api.push_details(Err(ApiError::Server {
            message: "boom".to_string(),
        }));
        let (mut reconciler, _rx) = reconciler(2);

        let user = subject();
        let probe = StaticProbe::new(true);
        reconciler.check(Some(&user), &api, &probe).await;
        reconciler.check(Some(&user), &api, &probe).await;
        assert_eq!(
            reconciler.check(Some(&user), &api, &probe).await,
            Step::Resolved
        );
        assert!(matches!(
            reconciler.state(),
            ViewState::Error {
                failure: InstanceFailure::Timeout,
                ..
            }
        ));
    }
}
