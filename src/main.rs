//! kube-triage CLI entry point.

use anyhow::Context;
use clap::Parser;

use kube_triage::cli::{self, Cli};
use kube_triage::infrastructure::config::ConfigLoader;
use kube_triage::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    let config = match ConfigLoader::resolve(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => cli::handle_error(err, args.json),
    };

    let _logger = match LogConfig::try_from(&config.logging)
        .map_err(anyhow::Error::msg)
        .and_then(|log_config| LoggerImpl::init(&log_config))
        .context("Failed to initialize logging")
    {
        Ok(logger) => logger,
        Err(err) => cli::handle_error(err, args.json),
    };

    if let Err(err) = cli::run(args.command, config, args.json).await {
        cli::handle_error(err, args.json);
    }
}
