//! Issue correlation capability backed by GitHub search.

use async_trait::async_trait;
use tracing::debug;

use crate::adapters::github::{GitHubClient, GitHubSearchItem};
use crate::domain::errors::DomainResult;
use crate::domain::models::{RelatedIssue, RelatedIssues};
use crate::domain::ports::IssueCorrelator;

/// Issues kept after a search.
pub const MAX_RELATED_ISSUES: usize = 3;

const DESCRIPTION_LIMIT: usize = 100;

/// Search terms for a failing pod: its name plus one failure-class keyword.
pub fn correlation_query(pod: &str, failures: &[String]) -> String {
    let joined = failures.join(" ").to_lowercase();
    let keyword = if joined.contains("oom") {
        "oom memory"
    } else if joined.contains("crash") {
        "crash"
    } else {
        "image"
    };
    format!("{pod} {keyword}")
}

fn truncate_description(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(DESCRIPTION_LIMIT) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

fn issue_number(url: &str) -> Option<u64> {
    url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

impl From<GitHubSearchItem> for RelatedIssue {
    fn from(item: GitHubSearchItem) -> Self {
        Self {
            number: issue_number(&item.html_url),
            description: truncate_description(item.body.as_deref().unwrap_or_default()),
            title: item.title,
            state: item.state,
            url: item.html_url,
        }
    }
}

/// Correlates failures with GitHub issues, broadening to a repository-only
/// search when the scoped search finds nothing.
pub struct GitHubIssueCorrelator {
    client: GitHubClient,
}

impl GitHubIssueCorrelator {
    /// Correlator searching through `client`.
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IssueCorrelator for GitHubIssueCorrelator {
    fn name(&self) -> &'static str {
        "github_issues"
    }

    async fn correlate(&self, query: &str, repository: &str) -> DomainResult<RelatedIssues> {
        let mut items = self
            .client
            .search_issues(&format!("repo:{repository} {query}"))
            .await?;

        if items.is_empty() {
            debug!(repository, query, "scoped search empty, broadening to repository");
            items = self
                .client
                .search_issues(&format!("repo:{repository}"))
                .await?;
        }

        Ok(RelatedIssues(
            items
                .into_iter()
                .take(MAX_RELATED_ISSUES)
                .map(RelatedIssue::from)
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failures(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_query_keyword_selection() {
        assert_eq!(
            correlation_query("api-0", &failures(&["OOMKilled"])),
            "api-0 oom memory"
        );
        assert_eq!(
            correlation_query("api-0", &failures(&["CrashLoopBackOff", "oomkilled"])),
            "api-0 oom memory"
        );
        assert_eq!(
            correlation_query("api-0", &failures(&["CrashLoopBackOff"])),
            "api-0 crash"
        );
        assert_eq!(
            correlation_query("api-0", &failures(&["connection refused"])),
            "api-0 image"
        );
    }

    #[test]
    fn test_truncate_description() {
        assert_eq!(truncate_description("short"), "short");
        let long = "x".repeat(150);
        let truncated = truncate_description(&long);
        assert_eq!(truncated.len(), 103);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate_description(&"y".repeat(100)), "y".repeat(100));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "é".repeat(120);
        let truncated = truncate_description(&text);
        assert_eq!(truncated.chars().count(), 103);
    }

    #[test]
    fn test_issue_number_from_url() {
        assert_eq!(
            issue_number("https://github.com/kubernetes/kubernetes/issues/12345"),
            Some(12345)
        );
        assert_eq!(issue_number("https://github.com/org/repo/pull/7/"), Some(7));
        assert_eq!(issue_number("https://github.com/org/repo"), None);
    }

    #[test]
    fn test_related_issue_from_item() {
        let issue = RelatedIssue::from(GitHubSearchItem {
            title: "Pods OOMKilled under load".to_string(),
            body: None,
            html_url: "https://github.com/org/repo/issues/9".to_string(),
            state: "closed".to_string(),
        });
        assert_eq!(issue.number, Some(9));
        assert_eq!(issue.description, "");
        assert_eq!(issue.state, "closed");
    }
}
