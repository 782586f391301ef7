//! Configuration model.

use serde::{Deserialize, Serialize};

/// Main configuration structure for kube-triage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Cluster API connection
    #[serde(default)]
    pub cluster: ClusterConfig,

    /// Poll loop and pass thresholds
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Issue tracker (GitHub search) settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Generative backend settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Copy with every credential replaced by a marker, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        let mask = |value: &mut Option<String>| {
            if value.is_some() {
                *value = Some("[REDACTED]".to_string());
            }
        };
        mask(&mut copy.cluster.token);
        mask(&mut copy.github.token);
        mask(&mut copy.llm.api_key);
        copy
    }
}

/// Cluster API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClusterConfig {
    /// Base URL of the API server (default: a local `kubectl proxy`)
    #[serde(default = "default_cluster_api_url")]
    pub api_url: String,

    /// Bearer token
    #[serde(default)]
    pub token: Option<String>,

    /// File holding a bearer token (e.g. a mounted service account token)
    #[serde(default)]
    pub token_file: Option<String>,

    /// PEM bundle used to verify the API server certificate
    #[serde(default)]
    pub ca_cert: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_cluster_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_cluster_api_url() -> String {
    "http://127.0.0.1:8001".to_string()
}

const fn default_cluster_timeout_secs() -> u64 {
    10
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            api_url: default_cluster_api_url(),
            token: None,
            token_file: None,
            ca_cert: None,
            request_timeout_secs: default_cluster_timeout_secs(),
        }
    }
}

/// Poll loop and per-pass thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MonitorConfig {
    /// Trailing log lines fetched per container
    #[serde(default = "default_log_tail_lines")]
    pub log_tail_lines: u32,

    /// Seconds between poll ticks
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Failure fragments quoted in the synthesis evidence (the report is never capped)
    #[serde(default = "default_max_failures_count")]
    pub max_failures_count: usize,

    /// Namespaces to poll; empty means every namespace
    #[serde(default = "default_namespaces")]
    pub namespaces: Vec<String>,

    /// Diagnostic passes run in parallel within one tick
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

const fn default_log_tail_lines() -> u32 {
    100
}

const fn default_interval_secs() -> u64 {
    60
}

const fn default_max_failures_count() -> usize {
    10
}

fn default_namespaces() -> Vec<String> {
    vec!["default".to_string()]
}

const fn default_concurrency() -> usize {
    4
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            log_tail_lines: default_log_tail_lines(),
            interval_secs: default_interval_secs(),
            max_failures_count: default_max_failures_count(),
            namespaces: default_namespaces(),
            concurrency: default_concurrency(),
        }
    }
}

/// GitHub issue search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GitHubConfig {
    /// REST API base URL
    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    /// Access token (falls back to `GITHUB_TOKEN`)
    #[serde(default)]
    pub token: Option<String>,

    /// Repository searched for related issues, as `owner/name`
    #[serde(default = "default_github_repository")]
    pub repository: String,

    /// Request timeout in seconds
    #[serde(default = "default_github_timeout_secs")]
    pub timeout_secs: u64,

    /// Results requested per search
    #[serde(default = "default_github_per_page")]
    pub per_page: u32,
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_github_repository() -> String {
    "kubernetes/kubernetes".to_string()
}

const fn default_github_timeout_secs() -> u64 {
    10
}

const fn default_github_per_page() -> u32 {
    5
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_github_api_url(),
            token: None,
            repository: default_github_repository(),
            timeout_secs: default_github_timeout_secs(),
            per_page: default_github_per_page(),
        }
    }
}

impl GitHubConfig {
    /// Configured token, else a non-empty `GITHUB_TOKEN`.
    pub fn resolve_token(&self) -> Option<String> {
        non_empty(self.token.clone()).or_else(|| non_empty(std::env::var("GITHUB_TOKEN").ok()))
    }
}

/// Generative backend (OpenAI-compatible chat completions) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LlmConfig {
    /// API base URL
    #[serde(default = "default_llm_api_url")]
    pub api_url: String,

    /// API key (falls back to `LLM_API_KEY`)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model name
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Completion token budget
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,

    /// Use canned advice when the backend fails for reasons other than rate limiting
    #[serde(default)]
    pub canned_advice_on_error: bool,
}

fn default_llm_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-3.5-turbo".to_string()
}

const fn default_llm_max_tokens() -> u32 {
    300
}

const fn default_llm_timeout_secs() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_llm_api_url(),
            api_key: None,
            model: default_llm_model(),
            max_tokens: default_llm_max_tokens(),
            timeout_secs: default_llm_timeout_secs(),
            canned_advice_on_error: false,
        }
    }
}

impl LlmConfig {
    /// Configured key, else a non-empty `LLM_API_KEY`.
    pub fn resolve_api_key(&self) -> Option<String> {
        non_empty(self.api_key.clone()).or_else(|| non_empty(std::env::var("LLM_API_KEY").ok()))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_thresholds() {
        let config = Config::default();
        assert_eq!(config.monitor.log_tail_lines, 100);
        assert_eq!(config.monitor.interval_secs, 60);
        assert_eq!(config.monitor.max_failures_count, 10);
        assert_eq!(config.github.timeout_secs, 10);
        assert_eq!(config.llm.timeout_secs, 30);
        assert_eq!(config.llm.max_tokens, 300);
        assert_eq!(config.github.repository, "kubernetes/kubernetes");
    }

    #[test]
    fn test_redacted_masks_credentials() {
        let mut config = Config::default();
        config.github.token = Some("ghp_secret".to_string());
        config.llm.api_key = Some("sk-secret".to_string());
        let redacted = config.redacted();
        assert_eq!(redacted.github.token.as_deref(), Some("[REDACTED]"));
        assert_eq!(redacted.llm.api_key.as_deref(), Some("[REDACTED]"));
        assert!(redacted.cluster.token.is_none());
    }

    #[test]
    fn test_resolve_api_key_prefers_config() {
        let config = LlmConfig {
            api_key: Some("sk-config".to_string()),
            ..Default::default()
        };
        temp_env::with_var("LLM_API_KEY", Some("sk-env"), || {
            assert_eq!(config.resolve_api_key().as_deref(), Some("sk-config"));
        });
    }

    #[test]
    fn test_resolve_api_key_ignores_blank_env() {
        temp_env::with_var("LLM_API_KEY", Some("  "), || {
            assert!(LlmConfig::default().resolve_api_key().is_none());
        });
        temp_env::with_var("GITHUB_TOKEN", Some("ghp_env"), || {
            assert_eq!(
                GitHubConfig::default().resolve_token().as_deref(),
                Some("ghp_env")
            );
        });
    }
}
