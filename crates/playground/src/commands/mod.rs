use std::io::{self, Write};
use std::sync::Arc;

use clap::ArgMatches;
use tracing::{error, warn};

use playground_core::panels::Notification;
use playground_core::{HttpClient, PlaygroundConfig, events};

mod admin;
mod instance;
mod session;
mod users;

pub(crate) type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Load configuration with warning on errors.
///
/// Falls back to defaults if config loading fails, but notifies the user via:
/// - stderr message for immediate visibility
/// - structured log event `cli.config.load_failed` for debugging
fn load_config_with_warning() -> PlaygroundConfig {
    match PlaygroundConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Could not load config: {}. Using defaults.\n\
                 Tip: Check ~/.playground/config.toml and ./.playground/config.toml for errors.",
                e
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                "Config load failed, using defaults"
            );
            PlaygroundConfig::default()
        }
    }
}

/// Everything a command needs to talk to the backend.
pub(crate) struct Context {
    pub config: PlaygroundConfig,
    pub api: Arc<HttpClient>,
}

impl Context {
    fn from_matches(matches: &ArgMatches) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = load_config_with_warning();
        if let Some(url) = matches.get_one::<String>("url") {
            config.api.base_url = Some(url.clone());
            config.validate()?;
        }
        let api = HttpClient::from_config(&config).inspect_err(|e| events::log_app_error(e))?;
        Ok(Self {
            config,
            api: Arc::new(api),
        })
    }
}

pub async fn run_command(matches: &ArgMatches) -> CommandResult {
    let Some((name, sub_matches)) = matches.subcommand() else {
        error!(event = "cli.command_unknown");
        return Err("Unknown command".into());
    };

    let ctx = Context::from_matches(matches)?;
    events::log_app_startup(name, ctx.api.base_url());

    let result = match name {
        "admin" => admin::handle_admin_command(&ctx, sub_matches).await,
        "users" => users::handle_users_command(&ctx, sub_matches).await,
        "session" => session::handle_session_command(&ctx, sub_matches).await,
        "instance" => instance::handle_instance_command(&ctx, sub_matches).await,
        _ => {
            error!(event = "cli.command_unknown", command = name);
            Err("Unknown command".into())
        }
    };

    if let Err(e) = &result {
        error!(event = "cli.command_failed", command = name, error = %e);
    }
    events::log_app_shutdown(name);
    result
}

/// Subcommand of a command group, or an error naming the group.
pub(crate) fn subcommand<'a>(
    group: &str,
    matches: &'a ArgMatches,
) -> Result<(&'a str, &'a ArgMatches), Box<dyn std::error::Error>> {
    matches.subcommand().ok_or_else(|| {
        error!(event = "cli.subcommand_missing", group = group);
        format!("Missing {group} subcommand").into()
    })
}

/// Turn a panel notification into a command error.
pub(crate) fn notification_error(
    notification: &Notification,
    fallback: &str,
) -> Box<dyn std::error::Error> {
    match notification.current() {
        Some(error) => match &error.cause {
            Some(cause) => format!("{error}: {cause}").into(),
            None => error.to_string().into(),
        },
        None => fallback.into(),
    }
}

/// Clear the terminal and draw `body` with a refresh footer.
pub(crate) fn redraw(body: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "\x1B[2J\x1B[1;1H")?;
    writeln!(stdout, "{body}")?;
    writeln!(
        stdout,
        "\nRefreshed at {}. Press Ctrl+C to exit.",
        chrono::Local::now().format("%H:%M:%S")
    )?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_with_warning_returns_valid_config() {
        let config = load_config_with_warning();
        assert!(config.max_retries() > 0);
    }

    #[test]
    fn test_notification_error_includes_cause() {
        use playground_core::panels::{Operation, OperationError};

        let mut notification = Notification::default();
        assert_eq!(
            notification_error(&notification, "failed").to_string(),
            "failed"
        );

        notification.set(OperationError::failed(Operation::DeleteUser, "HTTP 500"));
        assert_eq!(
            notification_error(&notification, "failed").to_string(),
            "Failed to delete user: HTTP 500"
        );
    }
}
