//! Capability registry.
//!
//! The [`CapabilityRegistry`] maps well-known names to typed capability
//! implementations so the diagnostic pipeline can be assembled from a
//! single place at startup and read-only afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::domain::ports::{
    ContextSource, FailureClassifier, IssueCorrelator, LogSource, RecommendationSynthesizer,
};

/// Name of the log source.
pub const LOG_SOURCE: &str = "k8s_logs";
/// Name of the failure classifier.
pub const FAILURE_CLASSIFIER: &str = "failure_detection";
/// Name of the context source.
pub const CONTEXT_SOURCE: &str = "k8s_context";
/// Name of the issue correlator.
pub const ISSUE_CORRELATOR: &str = "github_issues";
/// Name of the recommendation synthesizer.
pub const RECOMMENDATION_SYNTHESIZER: &str = "llm_recommendation";

/// A registered capability, tagged by the port it implements.
#[derive(Clone)]
pub enum Capability {
    /// Fetches new log output.
    LogSource(Arc<dyn LogSource>),
    /// Finds failure signatures.
    FailureClassifier(Arc<dyn FailureClassifier>),
    /// Describes the pod.
    ContextSource(Arc<dyn ContextSource>),
    /// Searches related issues.
    IssueCorrelator(Arc<dyn IssueCorrelator>),
    /// Produces remediation advice.
    RecommendationSynthesizer(Arc<dyn RecommendationSynthesizer>),
}

impl Capability {
    /// Port name, used in mismatch errors.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::LogSource(_) => "LogSource",
            Self::FailureClassifier(_) => "FailureClassifier",
            Self::ContextSource(_) => "ContextSource",
            Self::IssueCorrelator(_) => "IssueCorrelator",
            Self::RecommendationSynthesizer(_) => "RecommendationSynthesizer",
        }
    }

    /// Implementation name reported by the capability itself.
    pub fn implementation(&self) -> &'static str {
        match self {
            Self::LogSource(c) => c.name(),
            Self::FailureClassifier(c) => c.name(),
            Self::ContextSource(c) => c.name(),
            Self::IssueCorrelator(c) => c.name(),
            Self::RecommendationSynthesizer(c) => c.name(),
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.implementation())
    }
}

/// Name-to-capability map. Registering a name twice replaces the first entry.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    capabilities: HashMap<String, Capability>,
}

impl CapabilityRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `capability` under `name`, replacing any earlier entry.
    pub fn register(&mut self, name: impl Into<String>, capability: Capability) {
        let name = name.into();
        if let Some(previous) = self.capabilities.insert(name.clone(), capability) {
            tracing::debug!(name = %name, replaced = ?previous, "capability re-registered");
        }
    }

    /// Capability registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<&Capability> {
        self.capabilities.get(name)
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.capabilities.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
