//! CLI command implementations.

pub mod config;
pub mod diagnose;
pub mod scan;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::adapters::kubernetes::KubeApiClient;
use crate::domain::models::Config;
use crate::domain::ports::ClusterClient;
use crate::services::{standard_agent, DiagnosticAgent};

/// Cluster client and a fully wired agent for `config`.
pub(crate) fn connect(config: &Config) -> Result<(Arc<dyn ClusterClient>, DiagnosticAgent)> {
    let cluster: Arc<dyn ClusterClient> = Arc::new(
        KubeApiClient::new(&config.cluster).context("Failed to configure cluster client")?,
    );
    let agent = standard_agent(config, Arc::clone(&cluster))
        .context("Failed to assemble diagnostic pipeline")?;
    Ok((cluster, agent))
}
