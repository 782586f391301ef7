//! Failure classification port.

/// Scans text for known failure signatures.
pub trait FailureClassifier: Send + Sync {
    /// Registry name of the implementation.
    fn name(&self) -> &'static str;

    /// Every matching fragment, duplicates included.
    fn classify(&self, text: &str) -> Vec<String>;
}
