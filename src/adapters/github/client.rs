//! GitHub HTTP client with a search quota.
//!
//! Wraps the issue search endpoint of the GitHub REST API v3. Searches are
//! counted against a per-minute quota matching the search API limits: 30
//! with a token, 10 without. An exhausted quota fails the search at once
//! rather than waiting for the window to reset.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::warn;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::GitHubConfig;
use crate::infrastructure::logging::SecretScrubber;

use super::models::{GitHubSearchItem, GitHubSearchResponse};

const AUTHENTICATED_SEARCHES_PER_MINUTE: u32 = 30;
const ANONYMOUS_SEARCHES_PER_MINUTE: u32 = 10;
const QUOTA_WINDOW: Duration = Duration::from_secs(60);

/// Fixed-window search quota.
///
/// Refills to `capacity` once `window` has passed since the window opened.
/// [`try_take`](SearchQuota::try_take) never waits.
#[derive(Debug)]
pub struct SearchQuota {
    /// Searches allowed per window.
    capacity: u32,
    /// Searches left in the current window.
    remaining: u32,
    /// Window length.
    window: Duration,
    /// When the current window opened.
    opened: Instant,
}

impl SearchQuota {
    /// Full quota whose first window opens now.
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            capacity,
            remaining: capacity,
            window,
            opened: Instant::now(),
        }
    }

    /// Spend one search at `now`.
    ///
    /// Returns the time left until the window reopens when nothing is left.
    pub fn try_take(&mut self, now: Instant) -> Result<(), Duration> {
        let elapsed = now.saturating_duration_since(self.opened);
        if elapsed >= self.window {
            self.remaining = self.capacity;
            self.opened = now;
        }

        if self.remaining == 0 {
            return Err(self.window.saturating_sub(elapsed));
        }
        self.remaining -= 1;
        Ok(())
    }

    /// Searches allowed per window.
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Searches left in the current window.
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }
}

/// HTTP client for GitHub issue search.
///
/// Network, status and decode failures all map to
/// [`DomainError::IssueTracker`].
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    per_page: u32,
    quota: Arc<Mutex<SearchQuota>>,
    scrubber: SecretScrubber,
}

impl GitHubClient {
    /// Build a client from the `github` configuration section.
    ///
    /// The token is optional; anonymous search is allowed but gets a
    /// smaller bucket.
    pub fn new(config: &GitHubConfig) -> DomainResult<Self> {
        let token = config.resolve_token();
        let capacity = if token.is_some() {
            AUTHENTICATED_SEARCHES_PER_MINUTE
        } else {
            ANONYMOUS_SEARCHES_PER_MINUTE
        };
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::Configuration(format!("GitHub HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token,
            per_page: config.per_page,
            quota: Arc::new(Mutex::new(SearchQuota::new(capacity, QUOTA_WINDOW))),
            scrubber: SecretScrubber::new(),
        })
    }

    /// Whether searches carry a bearer token.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn take_quota(&self) -> DomainResult<()> {
        self.quota
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .try_take(Instant::now())
            .map_err(|retry_in| {
                warn!(
                    retry_in_secs = retry_in.as_secs(),
                    authenticated = self.is_authenticated(),
                    "GitHub search quota exhausted"
                );
                DomainError::IssueTracker(format!(
                    "GitHub search rate limit reached, retry in {}s",
                    retry_in.as_secs()
                ))
            })
    }

    fn search_request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", "kube-triage");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Run one `/search/issues` query, most recently updated first.
    ///
    /// `q` is passed through verbatim, qualifiers included
    /// (e.g. `repo:owner/name crash`).
    pub async fn search_issues(&self, q: &str) -> DomainResult<Vec<GitHubSearchItem>> {
        self.take_quota()?;
        let url = format!("{}/search/issues", self.base_url);
        let resp = self
            .search_request(&url)
            .query(&[
                ("q", q.to_string()),
                ("sort", "updated".to_string()),
                ("per_page", self.per_page.to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                DomainError::IssueTracker(self.scrubber.scrub(&format!(
                    "GitHub search request failed: {e}"
                )))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::IssueTracker(self.scrubber.scrub(&format!(
                "GitHub search returned {status}: {body}"
            ))));
        }

        resp.json::<GitHubSearchResponse>()
            .await
            .map(|response| response.items)
            .map_err(|e| DomainError::IssueTracker(format!("GitHub search parse failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_spends_then_refuses() {
        let mut quota = SearchQuota::new(2, Duration::from_secs(60));
        let now = Instant::now();
        assert!(quota.try_take(now).is_ok());
        assert!(quota.try_take(now).is_ok());
        assert_eq!(quota.remaining(), 0);

        let retry_in = quota.try_take(now).unwrap_err();
        assert!(retry_in <= Duration::from_secs(60));
        assert!(retry_in > Duration::ZERO);
    }

    #[test]
    fn test_quota_refills_after_window() {
        let mut quota = SearchQuota::new(1, Duration::from_secs(60));
        let now = Instant::now();
        quota.try_take(now).unwrap();
        assert!(quota.try_take(now + Duration::from_secs(30)).is_err());

        assert!(quota.try_take(now + Duration::from_secs(61)).is_ok());
        assert_eq!(quota.remaining(), 0);
    }

    #[test]
    fn test_exhausted_quota_fails_without_request() {
        let client = GitHubClient::new(&GitHubConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            token: Some("ghp_test_token".to_string()),
            ..Default::default()
        })
        .unwrap();
        *client.quota.lock().unwrap() = SearchQuota::new(0, QUOTA_WINDOW);

        let err = client.take_quota().unwrap_err();
        assert!(matches!(err, DomainError::IssueTracker(_)));
        assert!(err.to_string().contains("rate limit reached"));
    }

    #[test]
    fn test_quota_depends_on_token() {
        temp_env::with_var_unset("GITHUB_TOKEN", || {
            let anonymous = GitHubClient::new(&GitHubConfig::default()).unwrap();
            assert!(!anonymous.is_authenticated());
            assert_eq!(
                anonymous.quota.lock().unwrap().capacity(),
                ANONYMOUS_SEARCHES_PER_MINUTE
            );

            let authed = GitHubClient::new(&GitHubConfig {
                token: Some("ghp_test_token".to_string()),
                ..Default::default()
            })
            .unwrap();
            assert!(authed.is_authenticated());
            assert_eq!(
                authed.quota.lock().unwrap().capacity(),
                AUTHENTICATED_SEARCHES_PER_MINUTE
            );
        });
    }
}
