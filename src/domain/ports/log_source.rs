//! Log retrieval port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{LogFetch, WorkloadUnit};

/// Fetches recent output for one workload unit.
///
/// Implementations own any watermark state. Startup-class collaborator
/// errors must come back as [`LogFetch::Startup`], not as `Err`.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Registry name of the implementation.
    fn name(&self) -> &'static str;

    /// Output written since the last successful fetch, at most `max_lines` lines.
    async fn fetch(&self, unit: &WorkloadUnit, max_lines: u32) -> DomainResult<LogFetch>;
}
