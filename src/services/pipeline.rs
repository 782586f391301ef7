//! Startup wiring: build the capability registry from configuration.

use std::sync::Arc;

use tracing::info;

use crate::adapters::github::GitHubClient;
use crate::domain::errors::DomainResult;
use crate::domain::models::Config;
use crate::domain::ports::ClusterClient;
use crate::services::context_gatherer::ClusterContextSource;
use crate::services::diagnostic_agent::{AgentSettings, DiagnosticAgent};
use crate::services::failure_classifier::SignatureClassifier;
use crate::services::issue_correlator::GitHubIssueCorrelator;
use crate::services::log_retrieval::ClusterLogSource;
use crate::services::recommendation::LlmRecommendationSynthesizer;
use crate::services::registry::{
    Capability, CapabilityRegistry, CONTEXT_SOURCE, FAILURE_CLASSIFIER, ISSUE_CORRELATOR,
    LOG_SOURCE, RECOMMENDATION_SYNTHESIZER,
};

/// Register the five standard capabilities against `cluster`.
pub fn standard_registry(
    config: &Config,
    cluster: Arc<dyn ClusterClient>,
) -> DomainResult<CapabilityRegistry> {
    let github = GitHubClient::new(&config.github)?;
    let synthesizer = LlmRecommendationSynthesizer::new(&config.llm)?;
    info!(
        github_authenticated = github.is_authenticated(),
        llm_credential = synthesizer.has_credential(),
        repository = %config.github.repository,
        "capabilities configured"
    );

    let mut registry = CapabilityRegistry::new();
    registry.register(
        LOG_SOURCE,
        Capability::LogSource(Arc::new(ClusterLogSource::new(Arc::clone(&cluster)))),
    );
    registry.register(
        FAILURE_CLASSIFIER,
        Capability::FailureClassifier(Arc::new(SignatureClassifier::standard()?)),
    );
    registry.register(
        CONTEXT_SOURCE,
        Capability::ContextSource(Arc::new(ClusterContextSource::new(cluster))),
    );
    registry.register(
        ISSUE_CORRELATOR,
        Capability::IssueCorrelator(Arc::new(GitHubIssueCorrelator::new(github))),
    );
    registry.register(
        RECOMMENDATION_SYNTHESIZER,
        Capability::RecommendationSynthesizer(Arc::new(synthesizer)),
    );
    Ok(registry)
}

/// Registry plus agent in one step.
pub fn standard_agent(
    config: &Config,
    cluster: Arc<dyn ClusterClient>,
) -> DomainResult<DiagnosticAgent> {
    let registry = standard_registry(config, cluster)?;
    DiagnosticAgent::from_registry(&registry, AgentSettings::from(config))
}
