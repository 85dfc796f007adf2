use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

/// Commands accepted by the session lifecycle manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleCommand {
    /// Tear the session down and provision it again.
    Restart,
}

/// Zero-argument callback attached to an error view.
///
/// Invoking it asks the session lifecycle to recover; the error view itself
/// never retries on its own.
#[derive(Clone)]
pub struct RecoveryAction {
    label: &'static str,
    callback: Arc<dyn Fn() + Send + Sync>,
}

impl RecoveryAction {
    pub fn new(label: &'static str, callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            label,
            callback: Arc::new(callback),
        }
    }

    /// Action that sends [`LifecycleCommand::Restart`] to the lifecycle manager.
    pub fn restart(lifecycle: mpsc::UnboundedSender<LifecycleCommand>) -> Self {
        Self::new("restart", move || {
            if lifecycle.send(LifecycleCommand::Restart).is_err() {
                warn!(
                    event = "core.recovery.lifecycle_gone",
                    command = "restart"
                );
            }
        })
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn invoke(&self) {
        info!(event = "core.recovery.invoked", action = self.label);
        (self.callback)();
    }
}

impl fmt::Debug for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryAction")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_restart_action_sends_restart() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let action = RecoveryAction::restart(tx);

        action.invoke();
        assert_eq!(rx.try_recv().unwrap(), LifecycleCommand::Restart);
        assert_eq!(action.label(), "restart");
    }

    #[test]
    fn test_restart_without_lifecycle_does_not_panic() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        RecoveryAction::restart(tx).invoke();
    }

    #[test]
    fn test_clones_share_the_callback() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let action = RecoveryAction::new("count", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        action.clone().invoke();
        action.invoke();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
