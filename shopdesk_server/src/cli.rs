use std::{env, env::VarError};

/// There's no real CLI for the server, so any argument prints the help text and the current configuration.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    const DISPLAY_ENVS: [&str; 8] = [
        "RUST_LOG",
        "SHOPDESK_HOST",
        "SHOPDESK_PORT",
        "SHOPDESK_DATABASE_URL",
        "SHOPDESK_DB_MAX_CONNECTIONS",
        "SHOPDESK_RANKING_LIMIT",
        "SHOPDESK_DEFAULT_PAGE_SIZE",
        "SHOPDESK_ALLOW_PAID_TO_CANCELLED",
    ];

    println!("Current environment values:");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
