//! Service layer: the five pipeline capabilities, the registry that names
//! them, the diagnostic agent and the poll loop that drives it.

pub mod context_gatherer;
pub mod diagnostic_agent;
pub mod failure_classifier;
pub mod issue_correlator;
pub mod log_retrieval;
pub mod pipeline;
pub mod poll_loop;
pub mod recommendation;
pub mod registry;

pub use context_gatherer::ClusterContextSource;
pub use diagnostic_agent::{AgentSettings, DiagnosticAgent};
pub use failure_classifier::{SignatureCatalog, SignatureClassifier, DEFAULT_SIGNATURES};
pub use issue_correlator::{correlation_query, GitHubIssueCorrelator, MAX_RELATED_ISSUES};
pub use log_retrieval::ClusterLogSource;
pub use pipeline::{standard_agent, standard_registry};
pub use poll_loop::{PollEvent, PollHandle, PollLoop, TickReport};
pub use recommendation::{canned_advice, LlmRecommendationSynthesizer, NO_API_KEY_PLACEHOLDER};
pub use registry::{Capability, CapabilityRegistry};
