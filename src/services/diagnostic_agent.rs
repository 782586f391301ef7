//! Diagnostic agent: runs one pass of the triage pipeline for a workload unit.
//!
//! A pass moves through fixed stages:
//!
//! ```text
//! Fetching -> Classifying -> NoFailures
//!                         -> Enriching (context || correlation) -> Synthesizing -> Done
//! ```
//!
//! Only `Fetching` can fail the pass. Enrichment and synthesis degrade: a
//! failed context lookup or issue search leaves that evidence empty, and a
//! failed synthesis drops the recommendation but keeps the failures.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Config, Diagnosis, EvidenceBundle, RelatedIssues, WorkloadUnit};
use crate::domain::ports::{
    ContextSource, FailureClassifier, IssueCorrelator, LogSource, RecommendationSynthesizer,
};
use crate::services::issue_correlator::correlation_query;
use crate::services::registry::{
    Capability, CapabilityRegistry, CONTEXT_SOURCE, FAILURE_CLASSIFIER, ISSUE_CORRELATOR,
    LOG_SOURCE, RECOMMENDATION_SYNTHESIZER,
};

/// Per-pass thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    /// Trailing log lines requested per fetch.
    pub log_tail_lines: u32,
    /// Failure fragments quoted in the synthesis evidence.
    pub max_failures_count: usize,
    /// Issue tracker repository, `owner/name`.
    pub repository: String,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for AgentSettings {
    fn from(config: &Config) -> Self {
        Self {
            log_tail_lines: config.monitor.log_tail_lines,
            max_failures_count: config.monitor.max_failures_count,
            repository: config.github.repository.clone(),
        }
    }
}

/// Pass controller over the five pipeline capabilities.
#[derive(Clone)]
pub struct DiagnosticAgent {
    logs: Arc<dyn LogSource>,
    classifier: Arc<dyn FailureClassifier>,
    context: Arc<dyn ContextSource>,
    correlator: Arc<dyn IssueCorrelator>,
    synthesizer: Arc<dyn RecommendationSynthesizer>,
    settings: AgentSettings,
}

macro_rules! resolve {
    ($registry:expr, $name:expr, $variant:ident) => {
        match $registry.lookup($name) {
            Some(Capability::$variant(capability)) => Arc::clone(capability),
            Some(_) => {
                return Err(DomainError::CapabilityMismatch {
                    name: $name.to_string(),
                    expected: stringify!($variant),
                })
            }
            None => return Err(DomainError::CapabilityNotFound($name.to_string())),
        }
    };
}

impl DiagnosticAgent {
    /// Agent over explicitly supplied capabilities.
    pub fn new(
        logs: Arc<dyn LogSource>,
        classifier: Arc<dyn FailureClassifier>,
        context: Arc<dyn ContextSource>,
        correlator: Arc<dyn IssueCorrelator>,
        synthesizer: Arc<dyn RecommendationSynthesizer>,
        settings: AgentSettings,
    ) -> Self {
        Self {
            logs,
            classifier,
            context,
            correlator,
            synthesizer,
            settings,
        }
    }

    /// Resolve every capability by its well-known name.
    ///
    /// A missing name or a capability of the wrong kind is a configuration
    /// error.
    pub fn from_registry(
        registry: &CapabilityRegistry,
        settings: AgentSettings,
    ) -> DomainResult<Self> {
        Ok(Self::new(
            resolve!(registry, LOG_SOURCE, LogSource),
            resolve!(registry, FAILURE_CLASSIFIER, FailureClassifier),
            resolve!(registry, CONTEXT_SOURCE, ContextSource),
            resolve!(registry, ISSUE_CORRELATOR, IssueCorrelator),
            resolve!(registry, RECOMMENDATION_SYNTHESIZER, RecommendationSynthesizer),
            settings,
        ))
    }

    /// Settings the agent was built with.
    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// Run one diagnostic pass.
    ///
    /// Returns `Err` only when logs could not be fetched for a reason other
    /// than a container startup condition.
    #[instrument(skip_all, fields(pass_id = %Uuid::new_v4(), namespace = unit.namespace(), pod = unit.pod(), container = unit.container()))]
    pub async fn execute(&self, unit: &WorkloadUnit) -> DomainResult<Diagnosis> {
        debug!(stage = "fetching", "pass started");
        let fetched = self
            .logs
            .fetch(unit, self.settings.log_tail_lines)
            .await
            .inspect_err(|error| warn!(stage = "fetching", %error, "log retrieval failed"))?;

        let Some(logs) = fetched.text() else {
            debug!(stage = "classifying", "no new output");
            return Ok(Diagnosis::NoFailures);
        };

        let failures = self.classifier.classify(logs);
        if failures.is_empty() {
            debug!(stage = "classifying", "no failure signatures matched");
            return Ok(Diagnosis::NoFailures);
        }
        info!(stage = "classifying", failures = failures.len(), "failures detected");

        let query = correlation_query(unit.pod(), &failures);
        debug!(stage = "enriching", %query, "gathering context and related issues");
        let (context, related_issues) = tokio::join!(
            self.context.gather(unit.namespace(), unit.pod()),
            self.correlator.correlate(&query, &self.settings.repository)
        );
        let context = context
            .inspect_err(|error| warn!(stage = "enriching", %error, "context unavailable"))
            .ok();
        let related_issues = related_issues.unwrap_or_else(|error| {
            warn!(stage = "enriching", %error, "issue correlation failed");
            RelatedIssues::default()
        });

        let evidence = EvidenceBundle {
            unit: unit.clone(),
            failures,
            logs: logs.to_string(),
            context,
            related_issues,
        };

        debug!(stage = "synthesizing", "requesting recommendation");
        let recommendation = match self
            .synthesizer
            .synthesize(&evidence.render(self.settings.max_failures_count))
            .await
        {
            Ok(text) => Some(text),
            Err(error) => {
                warn!(stage = "synthesizing", %error, "recommendation unavailable");
                None
            }
        };

        debug!(stage = "done", has_recommendation = recommendation.is_some(), "pass finished");
        Ok(Diagnosis::Failures {
            failures: evidence.failures,
            recommendation,
        })
    }
}
