//! Recommendation synthesis capability.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::adapters::llm::ChatCompletionsClient;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::LlmConfig;
use crate::domain::ports::RecommendationSynthesizer;
use crate::infrastructure::logging::SecretScrubber;

/// Returned instead of calling the backend when no key is configured.
pub const NO_API_KEY_PLACEHOLDER: &str =
    "No API key provided. Set LLM_API_KEY environment variable.";

/// Canned advice for image pull failures.
pub const IMAGE_PULL_ADVICE: &str = "Image Pull Error - Check: 1) Image name/tag correctness 2) Registry accessibility 3) Image pull secrets 4) Network connectivity";
/// Canned advice for OOM kills.
pub const OUT_OF_MEMORY_ADVICE: &str = "OOM Error - Increase memory limits, check resource usage patterns, optimize application memory usage";
/// Canned advice for crash loops.
pub const CRASH_LOOP_ADVICE: &str = "CrashLoop Error - Check application logs, verify startup commands, review health checks, fix configuration issues";
/// Canned advice for failing probes.
pub const PROBE_FAILURE_ADVICE: &str = "Health Check Failed - Verify probe endpoints, adjust timeouts, check application startup time";
/// Canned advice when no keyword matches.
pub const GENERAL_ADVICE: &str = "General troubleshooting: 1) Check pod events 2) Review logs 3) Verify resources 4) Check dependencies";

/// Keyword table for canned advice; the first hit wins.
const CANNED_ADVICE: &[(&[&str], &str)] = &[
    (&["pull image", "imagepullbackoff", "errimagepull"], IMAGE_PULL_ADVICE),
    (&["oomkilled"], OUT_OF_MEMORY_ADVICE),
    (&["crashloopbackoff"], CRASH_LOOP_ADVICE),
    (&["probe failed"], PROBE_FAILURE_ADVICE),
];

/// Deterministic advice chosen by failure-class keywords in the evidence.
pub fn canned_advice(evidence: &str) -> &'static str {
    let lowered = evidence.to_lowercase();
    CANNED_ADVICE
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map_or(GENERAL_ADVICE, |(_, advice)| *advice)
}

fn prompt(evidence: &str) -> String {
    format!(
        "Analyze these Kubernetes pod failures and provide specific troubleshooting recommendations:\n\n{evidence}\n\nProvide actionable steps to resolve these issues."
    )
}

/// Asks an OpenAI-compatible chat model for remediation advice.
///
/// Without a key the placeholder is returned and no request is made. A
/// rate-limited backend yields canned advice; other failures are errors
/// unless `canned_advice_on_error` is set.
pub struct LlmRecommendationSynthesizer {
    client: Option<ChatCompletionsClient>,
    canned_advice_on_error: bool,
    scrubber: SecretScrubber,
}

impl LlmRecommendationSynthesizer {
    /// Synthesizer for the `llm` section. The key falls back to `LLM_API_KEY`.
    pub fn new(config: &LlmConfig) -> DomainResult<Self> {
        let client = config
            .resolve_api_key()
            .map(|key| ChatCompletionsClient::new(config, key))
            .transpose()?;
        Ok(Self {
            client,
            canned_advice_on_error: config.canned_advice_on_error,
            scrubber: SecretScrubber::new(),
        })
    }

    /// Whether an API key was found.
    pub fn has_credential(&self) -> bool {
        self.client.is_some()
    }
}

#[async_trait]
impl RecommendationSynthesizer for LlmRecommendationSynthesizer {
    fn name(&self) -> &'static str {
        "llm_recommendation"
    }

    async fn synthesize(&self, evidence: &str) -> DomainResult<String> {
        if evidence.trim().is_empty() {
            return Err(DomainError::Generation(
                "evidence cannot be empty".to_string(),
            ));
        }
        let Some(client) = &self.client else {
            debug!("no LLM credential configured, returning placeholder");
            return Ok(NO_API_KEY_PLACEHOLDER.to_string());
        };

        match client.complete(&prompt(evidence)).await {
            Ok(text) if text.trim().is_empty() => Err(DomainError::Generation(
                "backend returned an empty completion".to_string(),
            )),
            Ok(text) => Ok(text.trim().to_string()),
            Err(error) if error.is_rate_limited() => {
                warn!(model = client.model(), "LLM rate limited, using canned advice");
                Ok(canned_advice(evidence).to_string())
            }
            Err(error) if self.canned_advice_on_error => {
                warn!(error = %self.scrubber.scrub(&error.to_string()), "LLM failed, using canned advice");
                Ok(canned_advice(evidence).to_string())
            }
            Err(error) => Err(DomainError::Generation(
                self.scrubber.scrub(&error.to_string()),
            )),
        }
    }
}
