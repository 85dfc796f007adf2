//! Default values for configuration fields.
//!
//! Every field in the config files is optional; these constants fill the gaps
//! through the accessors on [`PlaygroundConfig`](super::PlaygroundConfig).

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Admin tables refresh every 5 seconds.
pub const DEFAULT_ADMIN_INTERVAL_SECS: u64 = 5;

/// The session panel follows the current session every second.
pub const DEFAULT_SESSION_INTERVAL_SECS: u64 = 1;

/// 5 minutes at one check per second.
pub const DEFAULT_MAX_RETRIES: u32 = 5 * 60;

pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 3000;
