//! Interval-driven snapshot polling.
//!
//! Each view that mirrors backend state (sessions, users, templates, the
//! current session) owns one poller. Pollers run independently of each other;
//! within a poller fetches are strictly sequential.

pub mod poller;

pub use poller::{PollHandle, PollStats, spawn_poller};
