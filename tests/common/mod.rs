//! Shared fakes for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kube_triage::adapters::kubernetes::InMemoryCluster;
use kube_triage::domain::errors::{DomainError, DomainResult};
use kube_triage::domain::models::{RelatedIssue, RelatedIssues};
use kube_triage::domain::ports::{IssueCorrelator, RecommendationSynthesizer};
use kube_triage::services::{
    AgentSettings, ClusterContextSource, ClusterLogSource, DiagnosticAgent, SignatureClassifier,
};

/// Issue correlator returning a fixed outcome and recording queries.
pub struct FakeCorrelator {
    result: Result<Vec<RelatedIssue>, String>,
    pub queries: Mutex<Vec<(String, String)>>,
}

impl FakeCorrelator {
    pub fn returning(issues: Vec<RelatedIssue>) -> Self {
        Self {
            result: Ok(issues),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl IssueCorrelator for FakeCorrelator {
    fn name(&self) -> &'static str {
        "fake_issues"
    }

    async fn correlate(&self, query: &str, repository: &str) -> DomainResult<RelatedIssues> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), repository.to_string()));
        self.result
            .clone()
            .map(RelatedIssues)
            .map_err(DomainError::IssueTracker)
    }
}

/// Synthesizer returning a fixed outcome and recording the evidence it saw.
pub struct FakeSynthesizer {
    result: Result<String, String>,
    calls: AtomicUsize,
    pub evidence: Mutex<Vec<String>>,
}

impl FakeSynthesizer {
    pub fn returning(text: &str) -> Self {
        Self {
            result: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            evidence: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            evidence: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecommendationSynthesizer for FakeSynthesizer {
    fn name(&self) -> &'static str {
        "fake_recommendation"
    }

    async fn synthesize(&self, evidence: &str) -> DomainResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.evidence.lock().unwrap().push(evidence.to_string());
        self.result.clone().map_err(DomainError::Generation)
    }
}

/// Agent over `cluster` with the real log, classifier and context
/// capabilities and the given fakes for the two remote collaborators.
pub fn agent(
    cluster: &InMemoryCluster,
    correlator: Arc<FakeCorrelator>,
    synthesizer: Arc<FakeSynthesizer>,
) -> DiagnosticAgent {
    let cluster = Arc::new(cluster.clone());
    DiagnosticAgent::new(
        Arc::new(ClusterLogSource::new(cluster.clone())),
        Arc::new(SignatureClassifier::standard().unwrap()),
        Arc::new(ClusterContextSource::new(cluster)),
        correlator,
        synthesizer,
        AgentSettings {
            log_tail_lines: 100,
            max_failures_count: 10,
            repository: "acme/platform".to_string(),
        },
    )
}

pub fn related_issue(number: u64, title: &str) -> RelatedIssue {
    RelatedIssue {
        number: Some(number),
        title: title.to_string(),
        state: "open".to_string(),
        description: String::new(),
        url: format!("https://github.com/acme/platform/issues/{number}"),
    }
}
