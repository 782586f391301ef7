//! Credential redaction for upstream error text.

use std::sync::LazyLock;

use regex::Regex;

/// Credential shapes and their replacements, applied in order.
static PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"Bearer\s+[A-Za-z0-9\-_.=]+", "Bearer [TOKEN_REDACTED]"),
        (r"token\s+gh[pousr]_[A-Za-z0-9]+", "token [TOKEN_REDACTED]"),
        (r"gh[pousr]_[A-Za-z0-9]{20,}", "[GITHUB_TOKEN_REDACTED]"),
        (r"github_pat_[A-Za-z0-9_]{20,}", "[GITHUB_TOKEN_REDACTED]"),
        (r"sk-[A-Za-z0-9\-_]{16,}", "[API_KEY_REDACTED]"),
        (
            r#"(?i)["']?(api_key|apikey|token|secret|password)["']?\s*[:=]\s*["']?[^"'\s,}]{8,}["']?"#,
            "$1=[REDACTED]",
        ),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
    .collect()
});

/// Removes credentials from text that may have been echoed by an upstream
/// service before it reaches logs or callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretScrubber;

impl SecretScrubber {
    /// Scrubber over the built-in patterns.
    pub const fn new() -> Self {
        Self
    }

    /// Scrub a message of sensitive data
    pub fn scrub(&self, message: &str) -> String {
        PATTERNS
            .iter()
            .fold(message.to_string(), |text, (pattern, replacement)| {
                pattern.replace_all(&text, *replacement).into_owned()
            })
    }
}
