//! GitHub search API response models.
//!
//! These structs map to the `/search/issues` JSON payload. Only the fields
//! used for correlation are read.

use serde::{Deserialize, Serialize};

/// An issue (or pull request) returned by issue search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSearchItem {
    /// Issue title.
    pub title: String,
    /// Issue body text (may be absent or null).
    #[serde(default)]
    pub body: Option<String>,
    /// URL to view the issue in the GitHub UI; ends in the issue number.
    pub html_url: String,
    /// "open" or "closed".
    pub state: String,
}

/// Envelope of `/search/issues`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSearchResponse {
    /// Total hits reported by GitHub, not just this page.
    #[serde(default)]
    pub total_count: u64,
    /// This page of results.
    #[serde(default)]
    pub items: Vec<GitHubSearchItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_body_and_extra_fields() {
        let json = r#"{
            "total_count": 1,
            "incomplete_results": false,
            "items": [{
                "number": 42,
                "title": "Pod stuck in ImagePullBackOff",
                "body": null,
                "html_url": "https://github.com/kubernetes/kubernetes/issues/42",
                "state": "open",
                "labels": []
            }]
        }"#;
        let response: GitHubSearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.items.len(), 1);
        assert!(response.items[0].body.is_none());
    }
}
