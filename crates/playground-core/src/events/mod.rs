//! Application lifecycle events shared by the CLI.

use tracing::{error, info, warn};

use crate::errors::PlaygroundError;

pub fn log_app_startup(command: &str, base_url: &str) {
    info!(
        event = "core.app.startup_completed",
        version = env!("CARGO_PKG_VERSION"),
        command = command,
        base_url = base_url
    );
}

pub fn log_app_shutdown(command: &str) {
    info!(event = "core.app.shutdown_completed", command = command);
}

/// User errors are logged as warnings, everything else as errors.
pub fn log_app_error(err: &dyn PlaygroundError) {
    if err.is_user_error() {
        warn!(
            event = "core.app.user_error",
            code = err.error_code(),
            error = %err
        );
    } else {
        error!(
            event = "core.app.error_occurred",
            code = err.error_code(),
            error = %err
        );
    }
}
