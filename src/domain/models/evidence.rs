//! Evidence gathered during one diagnostic pass.
//!
//! Nothing here is persisted; a fresh bundle is built for every pass and
//! dropped once the recommendation has been produced.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::domain::models::{StartupCondition, WorkloadUnit};
use crate::domain::ports::cluster::{ClusterEvent, ResourceSpec};

/// Outcome of a log retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFetch {
    /// The unit produced nothing since the last watermark.
    NoOutput,
    /// Raw log text.
    Output(String),
    /// The container could not serve logs; `text` describes why.
    Startup {
        condition: StartupCondition,
        text: String,
    },
}

impl LogFetch {
    /// Text to classify, or `None` for [`LogFetch::NoOutput`].
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::NoOutput => None,
            Self::Output(text) | Self::Startup { text, .. } => Some(text),
        }
    }
}

/// Scheduling information for the pod's host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NodeInfo {
    /// No node assigned yet.
    NotScheduled,
    /// `ready` is `None` when the node lookup failed.
    Scheduled { name: String, ready: Option<bool> },
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotScheduled => f.write_str("Not scheduled"),
            Self::Scheduled {
                name,
                ready: Some(ready),
            } => write!(f, "Node: {name}, Ready: {ready}"),
            Self::Scheduled { name, ready: None } => write!(f, "Node: {name}, Ready: unknown"),
        }
    }
}

/// An external object the pod depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name")]
pub enum Dependency {
    /// The pod's service account.
    ServiceAccount(String),
    /// A secret mounted as a volume.
    Secret(String),
    /// A config map mounted as a volume.
    ConfigMap(String),
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServiceAccount(name) => write!(f, "ServiceAccount: {name}"),
            Self::Secret(name) => write!(f, "Secret: {name}"),
            Self::ConfigMap(name) => write!(f, "ConfigMap: {name}"),
        }
    }
}

/// Cluster-side context for a pod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PodContext {
    /// Pod phase.
    pub pod_status: String,
    /// Events whose involved object is the pod.
    pub events: Vec<ClusterEvent>,
    /// Requests/limits keyed by container name; containers without either are omitted.
    pub resources: BTreeMap<String, ResourceSpec>,
    /// Host node and its readiness.
    pub node_info: NodeInfo,
    /// Service account, secrets and config maps the pod references.
    pub dependencies: Vec<Dependency>,
}

/// One historical issue related to a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedIssue {
    /// Taken from the final path segment of the issue URL.
    pub number: Option<u64>,
    /// Issue title.
    pub title: String,
    /// `open` or `closed`.
    pub state: String,
    /// Body excerpt, at most 100 characters plus an ellipsis.
    pub description: String,
    /// Link to the issue page.
    pub url: String,
}

/// Up to three related issues, rendered in a fixed template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelatedIssues(pub Vec<RelatedIssue>);

/// Text used when correlation found nothing or failed.
pub const NO_RELATED_ISSUES: &str = "No related GitHub issues found.";

impl RelatedIssues {
    /// Whether no issue was found.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of issues.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for RelatedIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str(NO_RELATED_ISSUES);
        }
        writeln!(f, "Related GitHub Issues:")?;
        for (i, issue) in self.0.iter().enumerate() {
            let number = issue
                .number
                .map_or_else(|| "?".to_string(), |n| n.to_string());
            writeln!(
                f,
                "{}. #{} {} ({})\n   {}",
                i + 1,
                number,
                issue.title,
                issue.state,
                issue.description
            )?;
        }
        Ok(())
    }
}

/// Everything known about a failing unit, handed to recommendation synthesis.
#[derive(Debug, Clone)]
pub struct EvidenceBundle {
    /// Failing container.
    pub unit: WorkloadUnit,
    /// Fragments quoted in the prompt, capped by `max_failures_count`.
    pub failures: Vec<String>,
    /// Log text the failures were found in.
    pub logs: String,
    /// `None` when the pod could not be described.
    pub context: Option<PodContext>,
    /// Correlated issues, possibly none.
    pub related_issues: RelatedIssues,
}

impl EvidenceBundle {
    /// Render the bundle as the single text blob sent to the generative backend.
    ///
    /// At most `max_failures` fragments are quoted; the remainder is counted.
    pub fn render(&self, max_failures: usize) -> String {
        let quoted = self.failures.len().min(max_failures.max(1));
        let mut failures = self.failures[..quoted].join(", ");
        if self.failures.len() > quoted {
            failures.push_str(&format!(" (and {} more)", self.failures.len() - quoted));
        }

        let context = self.context.as_ref().map_or_else(
            || "unavailable".to_string(),
            |ctx| serde_json::to_string(ctx).unwrap_or_else(|_| "unavailable".to_string()),
        );

        format!(
            "Pod: {}\nNamespace: {}\nContainer: {}\nFailures: {}\nLogs: {}\nK8s Context: {}\n{}",
            self.unit.pod(),
            self.unit.namespace(),
            self.unit.container(),
            failures,
            self.logs,
            context,
            self.related_issues
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> WorkloadUnit {
        WorkloadUnit::new("default", "api-0", "app").unwrap()
    }

    #[test]
    fn test_log_fetch_text() {
        assert_eq!(LogFetch::NoOutput.text(), None);
        assert_eq!(LogFetch::Output("boom".to_string()).text(), Some("boom"));
        let startup = LogFetch::Startup {
            condition: StartupCondition::ImagePull,
            text: "Container error: pull image".to_string(),
        };
        assert_eq!(startup.text(), Some("Container error: pull image"));
    }

    #[test]
    fn test_related_issues_template() {
        let issues = RelatedIssues(vec![RelatedIssue {
            number: Some(42),
            title: "OOM in api".to_string(),
            state: "open".to_string(),
            description: "Memory grows".to_string(),
            url: "https://github.com/org/repo/issues/42".to_string(),
        }]);
        assert_eq!(
            issues.to_string(),
            "Related GitHub Issues:\n1. #42 OOM in api (open)\n   Memory grows\n"
        );
        assert_eq!(RelatedIssues::default().to_string(), NO_RELATED_ISSUES);
    }

    #[test]
    fn test_render_caps_quoted_failures() {
        let bundle = EvidenceBundle {
            unit: unit(),
            failures: vec!["error:".to_string(), "timeout".to_string(), "panic:".to_string()],
            logs: "error: timeout panic:".to_string(),
            context: None,
            related_issues: RelatedIssues::default(),
        };
        let text = bundle.render(2);
        assert!(text.contains("Failures: error:, timeout (and 1 more)"));
        assert!(text.contains("K8s Context: unavailable"));
        assert!(text.ends_with(NO_RELATED_ISSUES));
    }

    #[test]
    fn test_render_serializes_context() {
        let bundle = EvidenceBundle {
            unit: unit(),
            failures: vec!["OOMKilled".to_string()],
            logs: "OOMKilled".to_string(),
            context: Some(PodContext {
                pod_status: "Running".to_string(),
                events: vec![],
                resources: BTreeMap::new(),
                node_info: NodeInfo::NotScheduled,
                dependencies: vec![Dependency::Secret("db-creds".to_string())],
            }),
            related_issues: RelatedIssues::default(),
        };
        let text = bundle.render(10);
        assert!(text.contains("\"pod_status\":\"Running\""));
        assert!(text.contains("db-creds"));
    }
}
