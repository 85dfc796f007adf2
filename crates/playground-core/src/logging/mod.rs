use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with optional quiet mode.
///
/// When `quiet` is true, only error-level events are emitted.
/// When `quiet` is false, info-level and above events are emitted (default).
/// Log lines are JSON on stderr so stdout stays clean for tables.
pub fn init_logging(quiet: bool) {
    let directive = if quiet {
        "playground=error"
    } else {
        "playground=info"
    };

    // A second call keeps the subscriber already installed.
    if let Err(e) = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(EnvFilter::from_default_env().add_directive(log_directive(directive)))
        .try_init()
    {
        tracing::debug!(event = "core.logging.already_initialized", error = %e);
    }
}

fn log_directive(directive: &str) -> tracing_subscriber::filter::Directive {
    directive
        .parse()
        .unwrap_or_else(|_| tracing::Level::INFO.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        init_logging(true);
        init_logging(false);
    }
}
