//! playground-core: Core library for the playground console
//!
//! Keeps a console in sync with the playground backend and the IDE instance
//! of the current session. Used by the `playground` CLI.
//!
//! # Main Entry Points
//!
//! - [`poll`] - Interval polling of backend snapshots
//! - [`snapshot`] - Latest snapshot per resource, with optimistic edits
//! - [`reconcile`] - Instance readiness check with bounded retries
//! - [`relay`] - Message relay to the instance frame
//! - [`panels`] - Admin and session panel state
//! - [`api`] - Backend client
//! - [`config`] - Configuration management

pub mod api;
pub mod config;
pub mod errors;
pub mod events;
pub mod logging;
pub mod panels;
pub mod poll;
pub mod reconcile;
pub mod relay;
pub mod snapshot;

// Re-export commonly used types at crate root for convenience
pub use api::{ApiError, HttpClient, PlaygroundApi};
pub use config::PlaygroundConfig;
pub use errors::{ConfigError, PlaygroundError, PlaygroundResult};
pub use poll::{PollHandle, spawn_poller};
pub use reconcile::{HttpProbe, Reconciler, ViewState, watch_instance};
pub use relay::{MessageBus, Relay, RelayError, Responder};
pub use snapshot::{ResourceStore, ResourceView, Snapshot};

pub use logging::init_logging;
