use std::collections::BTreeMap;

use clap::ArgMatches;
use tracing::{error, info};

use playground_core::PlaygroundApi;
use playground_core::api::{Session, Template};
use playground_core::panels::{
    ExistingSession, SessionDetails, SessionPanel, SessionView, TemplateSelector,
};

use super::{CommandResult, Context, notification_error, redraw, subcommand};
use crate::table::TableFormatter;

pub async fn handle_session_command(ctx: &Context, matches: &ArgMatches) -> CommandResult {
    let (name, sub_matches) = subcommand("session", matches)?;
    info!(event = "cli.session_started", command = name);

    match name {
        "show" if sub_matches.get_flag("watch") => watch_session(ctx).await,
        "show" => show_session(ctx, sub_matches.get_flag("json")).await,
        "create" => create_session(ctx, sub_matches).await,
        "stop" => stop_session(ctx).await,
        "connect" => connect_session(ctx).await,
        _ => {
            error!(event = "cli.session.unknown", command = name);
            Err(format!("Unknown session command: {name}").into())
        }
    }
}

fn render_details(details: &SessionDetails, url: &str) -> String {
    let mut out = vec![details.title.clone()];
    if let Some(started) = &details.started {
        out.push(started.clone());
    }
    out.push(details.phase.clone());
    if !url.is_empty() {
        out.push(format!("URL: {url}"));
    }

    if !details.env.is_empty() {
        let rows: Vec<Vec<String>> = details
            .env
            .iter()
            .map(|pair| vec![pair.name.clone(), pair.value.clone()])
            .collect();
        out.push(String::new());
        out.push(TableFormatter::new(&["Name", "Value"], &rows).render(&rows));
    }
    if !details.ports.is_empty() {
        let rows: Vec<Vec<String>> = details
            .ports
            .iter()
            .map(|port| vec![port.name.clone(), port.port.to_string(), port.path.clone()])
            .collect();
        out.push(String::new());
        out.push(TableFormatter::new(&["Name", "Port", "Path"], &rows).render(&rows));
    }
    out.join("\n")
}

fn render_selector(selector: &TemplateSelector) -> String {
    if let Some(message) = selector.error() {
        return message.to_string();
    }
    let selected = selector.selected().map(|(id, _)| id);
    let rows: Vec<Vec<String>> = selector
        .templates()
        .map(|(id, template)| {
            let marker = if Some(id) == selected { "*" } else { "" };
            vec![
                marker.to_string(),
                id.to_string(),
                template.name.clone(),
                template.description.clone(),
            ]
        })
        .collect();
    format!(
        "No running session. Public templates:\n{}",
        TableFormatter::new(&["", "ID", "Name", "Description"], &rows).render(&rows)
    )
}

fn render_view(view: &SessionView) -> String {
    match view {
        SessionView::Existing(existing) => {
            render_details(&existing.details(), &existing.session().url)
        }
        SessionView::Select(selector) => render_selector(selector),
    }
}

async fn show_session(ctx: &Context, json_output: bool) -> CommandResult {
    let api = ctx.api.as_ref();
    let current = api.get_current_session().await?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&current)?);
        return Ok(());
    }

    let view = match current {
        Some(session) => SessionView::Existing(ExistingSession::new(session)),
        None => SessionView::Select(public_templates(api, &api.get().await?.templates).await?),
    };
    println!("{}", render_view(&view));
    Ok(())
}

/// Selector over the public templates, reloaded once if none was public.
async fn public_templates<A: PlaygroundApi>(
    api: &A,
    templates: &BTreeMap<String, Template>,
) -> Result<TemplateSelector, Box<dyn std::error::Error>> {
    let mut selector = TemplateSelector::new(templates);
    if selector.error().is_some() && !selector.retry(api).await {
        if selector.notification.current().is_some() {
            return Err(notification_error(
                &selector.notification,
                "Failed to load templates",
            ));
        }
        info!(event = "cli.session.no_public_template");
    }
    Ok(selector)
}

async fn watch_session(ctx: &Context) -> CommandResult {
    let templates = ctx.api.get().await?.templates;
    let mut panel = SessionPanel::spawn(ctx.api.clone(), templates, ctx.config.session_interval());
    redraw("Loading...")?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            updated = panel.next_update() => {
                if !updated {
                    break;
                }
                redraw(&render_view(panel.view()))?;
            }
        }
    }

    panel.close().await;
    Ok(())
}

async fn create_session(ctx: &Context, matches: &ArgMatches) -> CommandResult {
    let api = ctx.api.as_ref();
    let playground = api.get().await?;

    let mut selector = public_templates(api, &playground.templates).await?;
    if let Some(message) = selector.error() {
        return Err(message.into());
    }
    if let Some(template) = matches.get_one::<String>("template")
        && !selector.select(template)
    {
        return Err(format!("'{template}' is not a public template").into());
    }

    let duration = matches.get_one::<u64>("duration").copied();
    let can_customize = playground
        .user
        .as_ref()
        .is_some_and(|user| user.can_customize_duration);
    if duration.is_some() && !can_customize {
        return Err("You are not allowed to customize the session duration".into());
    }

    if !selector.create(api, duration).await {
        return Err(notification_error(
            &selector.notification,
            "Failed to create a new session",
        ));
    }

    let template = selector.selected().map(|(id, _)| id).unwrap_or_default();
    println!("Session created from template '{template}'");
    info!(event = "cli.session.create_completed", template = template);
    Ok(())
}

async fn current_session(ctx: &Context) -> Result<Session, Box<dyn std::error::Error>> {
    ctx.api
        .get_current_session()
        .await?
        .ok_or_else(|| "No running session".into())
}

async fn stop_session(ctx: &Context) -> CommandResult {
    let mut existing = ExistingSession::new(current_session(ctx).await?);
    if !existing.stop(ctx.api.as_ref()).await {
        return Err(notification_error(
            &existing.notification,
            "Failed to stop the session",
        ));
    }
    println!("Session stopped");
    info!(event = "cli.session.stop_completed");
    Ok(())
}

async fn connect_session(ctx: &Context) -> CommandResult {
    let mut existing = ExistingSession::new(current_session(ctx).await?);
    let url = existing.connect().map(str::to_string);
    match url {
        Some(url) => {
            println!("{url}");
            Ok(())
        }
        None => Err(notification_error(
            &existing.notification,
            "Failed to connect to the session",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playground_core::api::{NameValuePair, Phase, Pod, Port, RuntimeConfiguration};

    fn template(public: bool) -> Template {
        Template {
            name: "Node".to_string(),
            image: "paritytech/node:latest".to_string(),
            description: "Substrate node".to_string(),
            tags: Some(BTreeMap::from([(
                "public".to_string(),
                public.to_string(),
            )])),
            runtime: Some(RuntimeConfiguration {
                env: Some(vec![NameValuePair {
                    name: "RUST_LOG".to_string(),
                    value: "info".to_string(),
                }]),
                ports: Some(vec![Port {
                    name: "web".to_string(),
                    path: "/".to_string(),
                    port: 8080,
                }]),
            }),
        }
    }

    #[test]
    fn test_render_selector_without_public_template() {
        let selector = TemplateSelector::new(&BTreeMap::from([("node".to_string(), template(false))]));
        assert_eq!(
            render_selector(&selector),
            playground_core::panels::NO_PUBLIC_TEMPLATE_MESSAGE
        );
    }

    #[test]
    fn test_render_selector_marks_selection() {
        let selector = TemplateSelector::new(&BTreeMap::from([("node".to_string(), template(true))]));
        let rendered = render_selector(&selector);
        assert!(rendered.starts_with("No running session."));
        assert!(rendered.contains("│ * │ node │"));
    }

    #[test]
    fn test_render_details_lists_env_and_ports() {
        let session = Session {
            template: template(true),
            url: "https://abc.playground.test".to_string(),
            pod: Pod {
                phase: Phase::Running,
                reason: None,
                message: None,
                start_time: Some(300),
            },
            duration: 60,
        };
        let rendered = render_view(&SessionView::Existing(ExistingSession::new(session)));
        assert!(rendered.starts_with("Node\n"));
        assert!(rendered.contains("Phase: Running"));
        assert!(rendered.contains("URL: https://abc.playground.test"));
        assert!(rendered.contains("RUST_LOG"));
        assert!(rendered.contains("8080"));
    }
}
