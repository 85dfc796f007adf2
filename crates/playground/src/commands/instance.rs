use clap::ArgMatches;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use playground_core::PlaygroundApi;
use playground_core::api::{PlaygroundUser, SessionConfiguration};
use playground_core::reconcile::{
    HttpProbe, LifecycleCommand, Reconciler, RecoveryAction, ViewState, watch_instance,
};

use super::{CommandResult, Context, subcommand};

pub async fn handle_instance_command(ctx: &Context, matches: &ArgMatches) -> CommandResult {
    let (name, sub_matches) = subcommand("instance", matches)?;
    match name {
        "wait" => wait_for_instance(ctx, sub_matches.get_flag("restart")).await,
        _ => {
            error!(event = "cli.instance.unknown", command = name);
            Err(format!("Unknown instance command: {name}").into())
        }
    }
}

/// Follow one readiness check, printing each state, until it resolves.
async fn follow(
    ctx: &Context,
    probe: &HttpProbe,
    subject: Option<PlaygroundUser>,
    recovery: RecoveryAction,
) -> ViewState {
    let reconciler = Reconciler::from_config(&ctx.config, recovery);
    let mut watch = watch_instance(ctx.api.clone(), probe.clone(), subject, reconciler);
    eprintln!("{}", watch.state());

    while let Some(state) = watch.changed().await {
        if !state.is_terminal() {
            eprintln!("{state}");
        }
    }
    let state = watch.resolved().await;
    watch.shutdown().await;
    state
}

async fn wait_for_instance(ctx: &Context, restart: bool) -> CommandResult {
    let probe = HttpProbe::new(ctx.config.probe_timeout())?;
    let subject = ctx.api.get().await?.user;
    if subject.is_none() {
        return Err("Not logged in".into());
    }

    info!(event = "cli.instance.wait_started", restart = restart);

    let (lifecycle, mut commands) = mpsc::unbounded_channel();
    let state = follow(
        ctx,
        &probe,
        subject.clone(),
        RecoveryAction::restart(lifecycle),
    )
    .await;

    let (failure, reason, action) = match state {
        ViewState::Success { url } => return report_ready(&url),
        ViewState::Error {
            failure,
            reason,
            action,
        } => (failure, reason, action),
        ViewState::Loading { .. } => return Err("Instance check stopped early".into()),
    };

    if !restart {
        error!(
            event = "cli.instance.wait_failed",
            code = failure.code(),
            reason = reason.as_str()
        );
        return Err(format!("{reason} ({})", failure.code()).into());
    }

    eprintln!("{reason}. Trying {}...", action.label());
    action.invoke();
    match commands.try_recv() {
        Ok(LifecycleCommand::Restart) => restart_session(ctx).await?,
        Err(e) => {
            warn!(event = "cli.instance.restart_not_requested", error = %e);
            return Err(format!("{reason} ({})", failure.code()).into());
        }
    }

    let retry = follow(
        ctx,
        &probe,
        subject,
        RecoveryAction::new("none", || {}),
    )
    .await;
    match retry {
        ViewState::Success { url } => report_ready(&url),
        ViewState::Error {
            failure, reason, ..
        } => {
            error!(
                event = "cli.instance.wait_failed",
                code = failure.code(),
                reason = reason.as_str()
            );
            Err(format!("{reason} ({})", failure.code()).into())
        }
        ViewState::Loading { .. } => Err("Instance check stopped early".into()),
    }
}

fn report_ready(url: &str) -> CommandResult {
    info!(event = "cli.instance.wait_completed", url = url);
    println!("{url}");
    Ok(())
}

/// Stop the current session and start a new one from the same template.
async fn restart_session(ctx: &Context) -> CommandResult {
    let api = ctx.api.as_ref();
    let session = api
        .get_current_session()
        .await?
        .ok_or("No running session to restart")?;

    let playground = api.get().await?;
    let template = playground
        .templates
        .iter()
        .find(|(_, template)| template.name == session.template.name)
        .map(|(id, _)| id.clone())
        .ok_or_else(|| format!("Template '{}' no longer exists", session.template.name))?;

    api.delete_session().await?;
    api.create_session(SessionConfiguration {
        template: template.clone(),
        duration: playground
            .user
            .as_ref()
            .filter(|user| user.can_customize_duration)
            .map(|_| session.duration),
    })
    .await?;

    info!(event = "cli.instance.session_restarted", template = template.as_str());
    Ok(())
}
