//! Domain models for the triage pipeline.

pub mod config;
pub mod diagnosis;
pub mod evidence;
pub mod workload;

pub use config::{ClusterConfig, Config, GitHubConfig, LlmConfig, LoggingConfig, MonitorConfig};
pub use diagnosis::{Diagnosis, UnitReport, NO_FAILURES, NO_RECOMMENDATION};
pub use evidence::{
    Dependency, EvidenceBundle, LogFetch, NodeInfo, PodContext, RelatedIssue, RelatedIssues,
    NO_RELATED_ISSUES,
};
pub use workload::{StartupCondition, WorkloadUnit};
