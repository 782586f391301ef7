//! Recommendation synthesis port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Turns rendered evidence into remediation advice.
#[async_trait]
pub trait RecommendationSynthesizer: Send + Sync {
    /// Registry name of the implementation.
    fn name(&self) -> &'static str;

    /// Advice for the rendered `evidence`.
    async fn synthesize(&self, evidence: &str) -> DomainResult<String>;
}
