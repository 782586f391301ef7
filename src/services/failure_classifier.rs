//! Failure signature catalog and the classifier built on it.

use regex::{Regex, RegexBuilder};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::FailureClassifier;

/// Known failure phrases. Wildcards use `.`, which never matches a newline,
/// so a single signature match stays on one log line.
pub const DEFAULT_SIGNATURES: &[&str] = &[
    "panic:",
    "error:",
    "failed to .*",
    "connection refused",
    "pull image",
    "startup error",
    "waiting to start",
    "imagepullbackoff",
    "crashloopbackoff",
    "oomkilled",
    "out of memory",
    "memory limit",
    "cpu throttling",
    "disk pressure",
    "evicted",
    "pending",
    "readiness probe failed",
    "liveness probe failed",
    "startup probe failed",
    "mount.*failed",
    "volume.*error",
    "secret.*not found",
    "configmap.*not found",
    "service unavailable",
    "timeout",
    "deadline exceeded",
    "context canceled",
    "permission denied",
    "forbidden",
    "unauthorized",
    "tls.*error",
    "dns.*error",
    "network.*unreachable",
    "no route to host",
];

/// Ordered, immutable set of case-insensitive signatures.
#[derive(Debug, Clone)]
pub struct SignatureCatalog {
    patterns: Vec<Regex>,
}

impl SignatureCatalog {
    /// Compile a catalog. An invalid pattern is a configuration error.
    pub fn new<S: AsRef<str>>(signatures: &[S]) -> DomainResult<Self> {
        let patterns = signatures
            .iter()
            .map(|signature| {
                let signature = signature.as_ref();
                RegexBuilder::new(signature)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        DomainError::Configuration(format!(
                            "invalid failure signature {signature:?}: {e}"
                        ))
                    })
            })
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// The built-in catalog.
    pub fn standard() -> DomainResult<Self> {
        Self::new(DEFAULT_SIGNATURES)
    }

    /// Number of signatures.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the catalog has no signatures.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Every match of every signature, in catalog order and then in order of
    /// appearance. Overlapping matches from different signatures all count.
    pub fn matches(&self, text: &str) -> Vec<String> {
        self.patterns
            .iter()
            .flat_map(|pattern| pattern.find_iter(text).map(|m| m.as_str().to_string()))
            .collect()
    }
}

/// [`FailureClassifier`] backed by a [`SignatureCatalog`].
#[derive(Debug, Clone)]
pub struct SignatureClassifier {
    catalog: SignatureCatalog,
}

impl SignatureClassifier {
    /// Classifier over `catalog`.
    pub fn new(catalog: SignatureCatalog) -> Self {
        Self { catalog }
    }

    /// Classifier over the built-in catalog.
    pub fn standard() -> DomainResult<Self> {
        Ok(Self::new(SignatureCatalog::standard()?))
    }
}

impl FailureClassifier for SignatureClassifier {
    fn name(&self) -> &'static str {
        "failure_detection"
    }

    fn classify(&self, text: &str) -> Vec<String> {
        self.catalog.matches(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> SignatureClassifier {
        SignatureClassifier::standard().unwrap()
    }

    #[test]
    fn test_standard_catalog_compiles() {
        assert_eq!(SignatureCatalog::standard().unwrap().len(), 34);
    }

    #[test]
    fn test_invalid_signature_is_configuration_error() {
        let err = SignatureCatalog::new(&["failed to (unclosed"]).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_case_insensitive_and_duplicates_kept() {
        let matches = classifier().classify("OOMKilled\nrestarted\noomkilled again");
        assert_eq!(matches, vec!["OOMKilled", "oomkilled"]);
    }

    #[test]
    fn test_wildcard_stops_at_line_end() {
        let matches = classifier().classify("Failed to connect to db\nretrying");
        assert_eq!(matches, vec!["Failed to connect to db"]);
    }

    #[test]
    fn test_wildcard_does_not_span_lines() {
        // "mount" and "failed" on different lines are not one signature
        let matches = classifier().classify("mount /data\nfailed");
        assert!(matches.is_empty());
    }

    #[test]
    fn test_overlapping_signatures_each_count() {
        let matches = classifier().classify("tls handshake error: bad certificate");
        assert_eq!(matches, vec!["error:", "tls handshake error"]);
    }

    #[test]
    fn test_catalog_order_then_appearance() {
        let matches = classifier().classify("timeout talking to api\npanic: nil map");
        assert_eq!(matches, vec!["panic:", "timeout"]);
    }

    #[test]
    fn test_clean_log_has_no_matches() {
        let matches = classifier().classify("GET /healthz 200 1ms\nserved 42 requests");
        assert!(matches.is_empty());
    }
}
