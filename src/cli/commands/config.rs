//! `config`: print the effective configuration.

use anyhow::Result;

use crate::cli::output::{output, ConfigOutput};
use crate::domain::models::Config;

/// Print the effective configuration.
pub fn execute(config: &Config, json: bool) -> Result<()> {
    output(&ConfigOutput::redacted(config), json);
    Ok(())
}
