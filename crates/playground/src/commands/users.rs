use clap::ArgMatches;
use tracing::{error, info};

use playground_core::api::User;
use playground_core::panels::{ResourcePanel, UsersPanel};
use playground_core::{PlaygroundApi, ResourceView, Snapshot};

use super::admin::render_view;
use super::{CommandResult, Context, notification_error, subcommand};

pub async fn handle_users_command(ctx: &Context, matches: &ArgMatches) -> CommandResult {
    let (name, sub_matches) = subcommand("users", matches)?;
    let api = ctx.api.as_ref();

    let current_user = api.get().await?.user.ok_or("Not logged in")?;
    if !current_user.admin {
        error!(event = "cli.users.forbidden", user = current_user.id.as_str());
        return Err(format!("User '{}' is not an admin", current_user.id).into());
    }

    let users = api.list_users().await?;
    let mut panel = UsersPanel::new(
        ResourcePanel::with_snapshot("Users", Snapshot::from(users)),
        current_user,
    );

    match name {
        "create" => create_user(ctx, &mut panel, sub_matches).await,
        "update" => update_user(ctx, &mut panel, sub_matches).await,
        "delete" => delete_user(ctx, &mut panel, sub_matches).await,
        _ => {
            error!(event = "cli.users.unknown", command = name);
            Err(format!("Unknown users command: {name}").into())
        }
    }
}

fn user_id(matches: &ArgMatches) -> Result<&str, Box<dyn std::error::Error>> {
    matches
        .get_one::<String>("id")
        .map(String::as_str)
        .ok_or_else(|| "Missing user id".into())
}

fn print_user(id: &str, user: User) {
    let snapshot = Snapshot::from_iter([(id, user)]);
    println!("{}", render_view(ResourceView::Table(&snapshot)));
}

async fn create_user(ctx: &Context, panel: &mut UsersPanel, matches: &ArgMatches) -> CommandResult {
    let id = user_id(matches)?;
    info!(event = "cli.users.create_started", id = id);

    panel.open_create_dialog();
    let Some(form) = panel.dialog.creation_form_mut() else {
        return Err("Creation dialog did not open".into());
    };
    form.id = id.to_string();
    form.can_customize_duration = matches.get_flag("can-customize-duration");
    let normalized = form.normalized_id();

    if !panel.can_submit_creation() {
        return Err(if normalized.is_empty() {
            "User id must not be empty".into()
        } else {
            format!("User '{normalized}' already exists").into()
        });
    }
    if !panel.submit_creation(ctx.api.as_ref()).await {
        return Err(notification_error(&panel.notification, "Failed to create user"));
    }

    println!("Created user '{normalized}'");
    if let Some(user) = panel.store().get(&normalized).copied() {
        print_user(&normalized, user);
    }
    info!(event = "cli.users.create_completed", id = normalized.as_str());
    Ok(())
}

async fn update_user(ctx: &Context, panel: &mut UsersPanel, matches: &ArgMatches) -> CommandResult {
    let id = user_id(matches)?;
    info!(event = "cli.users.update_started", id = id);

    panel.selection.toggle(id);
    if !panel.open_update_dialog() {
        return Err(format!("User '{id}' not found").into());
    }
    if let Some(form) = panel.dialog.update_form_mut() {
        if let Some(admin) = matches.get_one::<bool>("admin") {
            form.admin = *admin;
        }
        if let Some(flag) = matches.get_one::<bool>("can-customize-duration") {
            form.can_customize_duration = *flag;
        }
    }

    if !panel.can_submit_update() {
        println!("Nothing to update for '{id}'");
        return Ok(());
    }
    if !panel.submit_update(ctx.api.as_ref()).await {
        return Err(notification_error(&panel.notification, "Failed to update user"));
    }

    println!("Updated user '{id}'");
    if let Some(user) = panel.store().get(id).copied() {
        print_user(id, user);
    }
    info!(event = "cli.users.update_completed", id = id);
    Ok(())
}

async fn delete_user(ctx: &Context, panel: &mut UsersPanel, matches: &ArgMatches) -> CommandResult {
    let id = user_id(matches)?;
    info!(event = "cli.users.delete_started", id = id);

    if !panel.store().contains(id) {
        return Err(format!("User '{id}' not found").into());
    }
    panel.selection.toggle(id);
    if !panel.delete_selected(ctx.api.as_ref()).await {
        return Err(notification_error(&panel.notification, "Failed to delete user"));
    }

    println!("Deleted user '{id}'");
    info!(event = "cli.users.delete_completed", id = id);
    Ok(())
}
