//! Port trait definitions (Hexagonal Architecture)
//!
//! - ClusterClient: the orchestration API consumed by log retrieval and context gathering
//! - LogSource, FailureClassifier, ContextSource, IssueCorrelator,
//!   RecommendationSynthesizer: the five pipeline capabilities
//!
//! The diagnostic agent is written against these traits only, so any
//! capability can be swapped for a fake in tests.

pub mod classifier;
pub mod cluster;
pub mod context_source;
pub mod issue_correlator;
pub mod log_source;
pub mod synthesizer;

pub use classifier::FailureClassifier;
pub use cluster::{
    ClusterClient, ClusterError, ClusterEvent, ContainerDescriptor, LogRequest, NodeDescriptor,
    PodDescriptor, ResourceSpec, VolumeSource,
};
pub use context_source::ContextSource;
pub use issue_correlator::IssueCorrelator;
pub use log_source::LogSource;
pub use synthesizer::RecommendationSynthesizer;
