use std::fmt;

use crate::api::Phase;
use crate::reconcile::recovery::RecoveryAction;

/// Why an instance could not be reached. All variants are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceFailure {
    /// The backend has no instance for the current session.
    NotFound,
    /// The first container is stuck on a bad image or crash loop.
    CrashDetected { reason: String },
    /// The retry budget ran out while the instance stayed unreachable.
    Timeout,
}

impl InstanceFailure {
    pub fn code(&self) -> &'static str {
        match self {
            InstanceFailure::NotFound => "INSTANCE_NOT_FOUND",
            InstanceFailure::CrashDetected { .. } => "INSTANCE_CRASH_DETECTED",
            InstanceFailure::Timeout => "INSTANCE_TIMEOUT",
        }
    }
}

/// What the instance view shows. Exactly one is active at a time.
#[derive(Debug, Clone)]
pub enum ViewState {
    Loading {
        /// Last observed pod phase; `None` while still preparing.
        phase: Option<Phase>,
        retry: u32,
    },
    Success {
        url: String,
    },
    Error {
        failure: InstanceFailure,
        reason: String,
        action: RecoveryAction,
    },
}

impl ViewState {
    pub fn initial() -> Self {
        ViewState::Loading {
            phase: None,
            retry: 0,
        }
    }

    /// Success and Error end the readiness check.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ViewState::Loading { .. })
    }

    pub fn retry(&self) -> Option<u32> {
        match self {
            ViewState::Loading { retry, .. } => Some(*retry),
            _ => None,
        }
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewState::Loading { phase, retry } => {
                let phase = phase.map_or_else(|| "Preparing".to_string(), |p| p.to_string());
                if *retry > 0 {
                    write!(f, "{phase} (attempt {retry})")
                } else {
                    f.write_str(&phase)
                }
            }
            ViewState::Success { url } => write!(f, "Ready at {url}"),
            ViewState::Error { reason, .. } => f.write_str(reason),
        }
    }
}

/// Bounded count of unresolved checks.
///
/// `used` only grows, one per unresolved check, and never passes `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    used: u32,
    max: u32,
}

impl RetryBudget {
    pub fn new(max: u32) -> Self {
        Self { used: 0, max }
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.max
    }

    /// Take one retry. Returns false, leaving the count unchanged, once exhausted.
    pub fn try_consume(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.used += 1;
        true
    }

    pub fn reset(&mut self) {
        self.used = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_stops_at_max() {
        let mut budget = RetryBudget::new(3);
        assert!(budget.try_consume());
        assert!(budget.try_consume());
        assert!(budget.try_consume());
        assert!(budget.is_exhausted());
        assert!(!budget.try_consume());
        assert_eq!(budget.used(), 3);

        budget.reset();
        assert_eq!(budget.used(), 0);
        assert!(!budget.is_exhausted());
    }

    #[test]
    fn test_initial_state_is_loading_preparing() {
        let state = ViewState::initial();
        assert!(!state.is_terminal());
        assert_eq!(state.retry(), Some(0));
        assert_eq!(state.to_string(), "Preparing");
    }

    #[test]
    fn test_loading_display_includes_attempt() {
        let state = ViewState::Loading {
            phase: Some(Phase::Pending),
            retry: 4,
        };
        assert_eq!(state.to_string(), "Pending (attempt 4)");
    }
}
