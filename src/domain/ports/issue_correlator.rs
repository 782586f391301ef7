//! Issue correlation port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::RelatedIssues;

/// Looks up historical reports related to a failure.
#[async_trait]
pub trait IssueCorrelator: Send + Sync {
    /// Registry name of the implementation.
    fn name(&self) -> &'static str;

    /// Search `repository` (`owner/name`) for `query`, broadening the search
    /// when the scoped query finds nothing.
    async fn correlate(&self, query: &str, repository: &str) -> DomainResult<RelatedIssues>;
}
