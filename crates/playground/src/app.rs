use clap::{Arg, ArgAction, Command, value_parser};

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Output in JSON format")
        .action(ArgAction::SetTrue)
}

fn admin_tab(name: &'static str, about: &'static str) -> Command {
    Command::new(name).about(about).arg(json_arg()).arg(
        Arg::new("watch")
            .long("watch")
            .short('w')
            .help("Keep polling and redraw on every refresh (Ctrl+C to exit)")
            .action(ArgAction::SetTrue),
    )
}

fn flag_value(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help)
        .value_parser(value_parser!(bool))
}

pub fn build_cli() -> Command {
    Command::new("playground")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Console for the substrate playground")
        .long_about("Inspect and administer a playground backend: list templates, users and sessions, manage your own session and wait for its IDE instance to become reachable.")
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only log errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("url")
                .long("url")
                .help("Backend base URL (overrides config)")
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("admin")
                .about("Admin console tabs")
                .subcommand_required(true)
                .subcommand(admin_tab("details", "Show global configuration"))
                .subcommand(admin_tab("templates", "List templates"))
                .subcommand(admin_tab("users", "List users"))
                .subcommand(admin_tab("sessions", "List running sessions")),
        )
        .subcommand(
            Command::new("users")
                .about("Manage users (admin only)")
                .subcommand_required(true)
                .subcommand(
                    Command::new("create")
                        .about("Create a user")
                        .arg(
                            Arg::new("id")
                                .help("GitHub id of the user")
                                .required(true)
                                .index(1),
                        )
                        .arg(
                            Arg::new("can-customize-duration")
                                .long("can-customize-duration")
                                .help("Allow the user to pick their session duration")
                                .action(ArgAction::SetTrue),
                        ),
                )
                .subcommand(
                    Command::new("update")
                        .about("Update a user's flags")
                        .arg(Arg::new("id").help("User id").required(true).index(1))
                        .arg(flag_value("admin", "Grant or revoke admin rights"))
                        .arg(flag_value(
                            "can-customize-duration",
                            "Allow or forbid picking the session duration",
                        )),
                )
                .subcommand(
                    Command::new("delete")
                        .about("Delete a user")
                        .arg(Arg::new("id").help("User id").required(true).index(1)),
                ),
        )
        .subcommand(
            Command::new("session")
                .about("Manage your session")
                .subcommand_required(true)
                .subcommand(
                    Command::new("show")
                        .about("Show the current session, or the templates to start one from")
                        .arg(json_arg())
                        .arg(
                            Arg::new("watch")
                                .long("watch")
                                .short('w')
                                .help("Follow the current session until Ctrl+C")
                                .action(ArgAction::SetTrue),
                        ),
                )
                .subcommand(
                    Command::new("create")
                        .about("Start a session from a public template")
                        .arg(
                            Arg::new("template")
                                .long("template")
                                .short('t')
                                .help("Template id (default: first public template)"),
                        )
                        .arg(
                            Arg::new("duration")
                                .long("duration")
                                .short('d')
                                .help("Session duration in minutes")
                                .value_parser(value_parser!(u64)),
                        ),
                )
                .subcommand(Command::new("stop").about("Stop the current session"))
                .subcommand(
                    Command::new("connect").about("Print the URL of the running session"),
                ),
        )
        .subcommand(
            Command::new("instance")
                .about("IDE instance of the current session")
                .subcommand_required(true)
                .subcommand(
                    Command::new("wait")
                        .about("Wait until the instance is reachable")
                        .arg(
                            Arg::new("restart")
                                .long("restart")
                                .help("Restart the session once if the instance fails")
                                .action(ArgAction::SetTrue),
                        ),
                ),
        )
}
