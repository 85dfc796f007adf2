use std::collections::BTreeMap;

use clap::ArgMatches;
use serde::Serialize;
use tracing::info;

use playground_core::api::{Session, Template, User};
use playground_core::panels::{
    AdminTab, DetailsPanel, ResourcePanel, sessions_panel, templates_panel, users_resource,
};
use playground_core::{PlaygroundApi, ResourceView, Snapshot, spawn_poller};

use super::{CommandResult, Context, redraw, subcommand};
use crate::table::TableFormatter;

/// How a resource renders as a table row.
pub(crate) trait TableRow {
    const HEADERS: &'static [&'static str];

    fn cells(id: &str, value: &Self) -> Vec<String>;
}

impl TableRow for Session {
    const HEADERS: &'static [&'static str] = &["ID", "Template", "URL"];

    fn cells(id: &str, session: &Self) -> Vec<String> {
        vec![
            id.to_string(),
            session.template.name.clone(),
            session.url.clone(),
        ]
    }
}

impl TableRow for Template {
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Image"];

    fn cells(id: &str, template: &Self) -> Vec<String> {
        vec![
            id.to_string(),
            template.name.clone(),
            template.image.clone(),
        ]
    }
}

impl TableRow for User {
    const HEADERS: &'static [&'static str] = &["ID", "Admin", "Can Customize Duration"];

    fn cells(id: &str, user: &Self) -> Vec<String> {
        vec![
            id.to_string(),
            user.admin.to_string(),
            user.can_customize_duration.to_string(),
        ]
    }
}

pub(crate) fn render_view<T: TableRow>(view: ResourceView<'_, T>) -> String {
    match view {
        ResourceView::Loading => "Loading...".to_string(),
        ResourceView::Empty { label } => label,
        ResourceView::Table(snapshot) => {
            let rows: Vec<Vec<String>> = snapshot
                .iter()
                .map(|(id, value)| T::cells(id, value))
                .collect();
            TableFormatter::new(T::HEADERS, &rows).render(&rows)
        }
    }
}

fn snapshot_json<T: Serialize>(snapshot: Option<&Snapshot<T>>) -> serde_json::Result<String> {
    let entries: BTreeMap<&String, &T> = snapshot.into_iter().flat_map(|s| s.iter()).collect();
    serde_json::to_string(&entries)
}

pub async fn handle_admin_command(ctx: &Context, matches: &ArgMatches) -> CommandResult {
    let (name, tab_matches) = subcommand("admin", matches)?;
    let tab: AdminTab = name.parse()?;
    let json_output = tab_matches.get_flag("json");
    let watch_mode = tab_matches.get_flag("watch");

    info!(
        event = "cli.admin_started",
        tab = %tab,
        json_output = json_output,
        watch_mode = watch_mode
    );

    let interval = ctx.config.admin_interval();
    let api = ctx.api.clone();
    match (tab, watch_mode) {
        (AdminTab::Details, false) => {
            let mut details = DetailsPanel::default();
            details.apply(api.get().await?.configuration);
            print_details(&details, json_output)?;
        }
        (AdminTab::Details, true) => watch_details(ctx, json_output).await?,
        (AdminTab::Templates, false) => {
            print_once("Templates", api.get().await?.templates, json_output)?
        }
        (AdminTab::Templates, true) => {
            watch_panel(templates_panel(api, interval), json_output).await?
        }
        (AdminTab::Users, false) => print_once("Users", api.list_users().await?, json_output)?,
        (AdminTab::Users, true) => watch_panel(users_resource(api, interval), json_output).await?,
        (AdminTab::Sessions, false) => {
            print_once("Sessions", api.list_sessions().await?, json_output)?
        }
        (AdminTab::Sessions, true) => {
            watch_panel(sessions_panel(api, interval), json_output).await?
        }
    }

    info!(event = "cli.admin_completed", tab = %tab);
    Ok(())
}

fn print_details(details: &DetailsPanel, json_output: bool) -> CommandResult {
    if json_output {
        println!("{}", serde_json::to_string_pretty(&details.configuration())?);
    } else {
        println!("{}", details.summary());
    }
    Ok(())
}

fn print_once<T>(label: &'static str, entries: BTreeMap<String, T>, json_output: bool) -> CommandResult
where
    T: TableRow + Serialize + Clone + Send + Sync + 'static,
{
    if json_output {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    let panel = ResourcePanel::with_snapshot(label, Snapshot::from(entries));
    println!("{}", render_view(panel.view()));
    Ok(())
}

async fn watch_panel<T>(mut panel: ResourcePanel<T>, json_output: bool) -> CommandResult
where
    T: TableRow + Serialize + Clone + Send + Sync + 'static,
{
    if !json_output {
        redraw(&render_view(panel.view()))?;
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            updated = panel.next_update() => {
                if !updated {
                    break;
                }
                if json_output {
                    println!("{}", snapshot_json(panel.store().snapshot())?);
                } else {
                    redraw(&render_view(panel.view()))?;
                }
            }
        }
    }

    panel.close().await;
    Ok(())
}

async fn watch_details(ctx: &Context, json_output: bool) -> CommandResult {
    let api = ctx.api.clone();
    let mut poll = spawn_poller("details", ctx.config.admin_interval(), move || {
        let api = api.clone();
        async move { api.get().await.map(|playground| playground.configuration) }
    });
    let mut details = DetailsPanel::default();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            configuration = poll.changed() => {
                let Some(configuration) = configuration else {
                    break;
                };
                details.apply(configuration);
                if json_output {
                    println!("{}", serde_json::to_string(&details.configuration())?);
                } else {
                    redraw(&details.summary())?;
                }
            }
        }
    }

    poll.shutdown().await;
    Ok(())
}
