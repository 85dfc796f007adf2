//! Instance readiness check.
//!
//! After a session starts, its IDE instance takes a while to become
//! reachable. The [`Reconciler`] repeatedly looks at the instance details
//! and settles on one of:
//!
//! - `Success` once the instance URL answers,
//! - `Error` when the instance is missing, crash-looping, or never answered
//!   within the retry budget.
//!
//! Every error view carries a [`RecoveryAction`] that asks the session
//! lifecycle to restart.

pub mod probe;
pub mod reconciler;
pub mod recovery;
pub mod types;
pub mod watcher;

pub use probe::{HttpProbe, Probe};
pub use reconciler::{CRASH_REASONS, NOT_FOUND_MESSAGE, Reconciler, Step, TIMEOUT_MESSAGE};
pub use recovery::{LifecycleCommand, RecoveryAction};
pub use types::{InstanceFailure, RetryBudget, ViewState};
pub use watcher::{InstanceWatch, watch_instance};
