//! Command-line interface: argument types, output formatting and the
//! subcommand handlers.

pub mod commands;
pub mod output;
pub mod types;

use console::style;

pub use types::{Cli, Commands, ScopeArgs};

use crate::domain::models::Config;

/// Dispatch a parsed command against a loaded configuration.
pub async fn run(command: Commands, config: Config, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Watch { scope, interval } => {
            commands::watch::execute(config, &scope, interval, json).await
        }
        Commands::Scan { scope } => commands::scan::execute(config, &scope, json).await,
        Commands::Diagnose {
            namespace,
            pod,
            container,
        } => commands::diagnose::execute(&config, namespace, pod, container, json).await,
        Commands::Config => commands::config::execute(&config, json),
    }
}

/// Print `err` and exit with status 1.
pub fn handle_error(err: anyhow::Error, json: bool) -> ! {
    if json {
        println!("{}", serde_json::json!({ "error": format!("{err:#}") }));
    } else {
        eprintln!("{} {err:#}", style("Error:").red().bold());
    }
    std::process::exit(1);
}
