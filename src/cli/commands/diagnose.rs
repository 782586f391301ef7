//! `diagnose`: one pass over one container.

use anyhow::{Context, Result};

use crate::cli::commands::connect;
use crate::cli::output::{output, DiagnoseOutput};
use crate::domain::models::{Config, WorkloadUnit};

/// Run one diagnostic pass and print the verdict.
pub async fn execute(
    config: &Config,
    namespace: String,
    pod: String,
    container: String,
    json: bool,
) -> Result<()> {
    let unit = WorkloadUnit::new(namespace, pod, container)?;
    let (_, agent) = connect(config)?;
    let diagnosis = agent
        .execute(&unit)
        .await
        .with_context(|| format!("Diagnosis of {unit} failed"))?;
    output(&DiagnoseOutput::new(unit, &diagnosis), json);
    Ok(())
}
