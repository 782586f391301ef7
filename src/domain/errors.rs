//! Domain errors for the triage pipeline.

use thiserror::Error;

use crate::domain::ports::cluster::ClusterError;

/// Domain-level errors that can cross a capability seam.
///
/// Variants fall into three groups:
/// - configuration: the pipeline is wired or invoked incorrectly; never retried
/// - collaborator: a remote dependency (cluster, issue tracker, generative
///   backend) failed; callers decide whether the pass degrades or aborts
/// - data shape: a collaborator answered with something that cannot be used
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Capability not registered: {0}")]
    CapabilityNotFound(String),

    #[error("Capability {name} is not a {expected}")]
    CapabilityMismatch { name: String, expected: &'static str },

    #[error("Invalid workload unit: {0}")]
    InvalidWorkloadUnit(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to fetch logs: {0}")]
    LogFetch(#[source] ClusterError),

    #[error("Cluster request failed: {0}")]
    Cluster(#[from] ClusterError),

    #[error("Issue tracker request failed: {0}")]
    IssueTracker(String),

    #[error("Recommendation generation failed: {0}")]
    Generation(String),

    #[error("Unexpected data shape: {0}")]
    DataShape(String),
}

impl DomainError {
    /// True for errors caused by wiring or input rather than a remote dependency.
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::CapabilityNotFound(_)
                | Self::CapabilityMismatch { .. }
                | Self::InvalidWorkloadUnit(_)
                | Self::Configuration(_)
        )
    }
}

/// Result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::DataShape(err.to_string())
    }
}
