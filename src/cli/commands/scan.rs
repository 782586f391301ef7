//! `scan`: a single tick.

use anyhow::{Context, Result};

use crate::cli::commands::connect;
use crate::cli::output::{output, ScanOutput};
use crate::cli::types::ScopeArgs;
use crate::domain::models::Config;
use crate::services::PollLoop;

/// Run a single tick and print its report.
pub async fn execute(mut config: Config, scope: &ScopeArgs, json: bool) -> Result<()> {
    scope.apply(&mut config);
    let (cluster, agent) = connect(&config)?;
    let report = PollLoop::new(cluster, agent, &config.monitor)
        .run_tick(1)
        .await
        .context("Scan failed")?;
    output(&ScanOutput(report), json);
    Ok(())
}
