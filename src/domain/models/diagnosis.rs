//! Result of a diagnostic pass and the scan report derived from it.

use std::fmt;

use serde::Serialize;

use crate::domain::models::WorkloadUnit;

/// Verdict text for a pass that found nothing.
///
/// Presentation layers match on this literal.
pub const NO_FAILURES: &str = "No failures detected";

/// Recommendation column used when a pass degraded past synthesis.
pub const NO_RECOMMENDATION: &str = "No recommendation available";

/// Verdict of one diagnostic pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnosis {
    /// The logs matched no failure signature.
    NoFailures,
    /// At least one failure fragment. `recommendation` is `None` only when
    /// synthesis failed outright.
    Failures {
        failures: Vec<String>,
        recommendation: Option<String>,
    },
}

impl Diagnosis {
    /// Whether any failure fragment was found.
    pub fn has_failures(&self) -> bool {
        matches!(self, Self::Failures { .. })
    }

    /// Failure fragments, empty for a clean unit.
    pub fn failures(&self) -> &[String] {
        match self {
            Self::NoFailures => &[],
            Self::Failures { failures, .. } => failures,
        }
    }

    /// Synthesized advice, if any.
    pub fn recommendation(&self) -> Option<&str> {
        match self {
            Self::NoFailures => None,
            Self::Failures { recommendation, .. } => recommendation.as_deref(),
        }
    }

    /// The `Failures: [...]` line, or `None` when nothing was found.
    pub fn failures_line(&self) -> Option<String> {
        match self {
            Self::NoFailures => None,
            Self::Failures { failures, .. } => Some(format!("Failures: [{}]", failures.join(", "))),
        }
    }
}

/// `No failures detected`, or `Failures: [..]` optionally followed by
/// `\nRecommendation: ..`.
impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.failures_line(), self.recommendation()) {
            (None, _) => f.write_str(NO_FAILURES),
            (Some(line), Some(recommendation)) => {
                write!(f, "{line}\nRecommendation: {recommendation}")
            }
            (Some(line), None) => f.write_str(&line),
        }
    }
}

/// One row of a scan report: a unit that has failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitReport {
    /// Namespace of the pod.
    pub namespace: String,
    /// Pod name.
    pub pod_name: String,
    /// Container name.
    pub container_name: String,
    /// The `Failures: [...]` line.
    pub failures: String,
    /// Advice, or `No recommendation available`.
    pub recommendation: String,
}

impl UnitReport {
    /// Build a row, or `None` for a clean unit.
    pub fn from_diagnosis(unit: &WorkloadUnit, diagnosis: &Diagnosis) -> Option<Self> {
        let failures = diagnosis.failures_line()?;
        Some(Self {
            namespace: unit.namespace().to_string(),
            pod_name: unit.pod().to_string(),
            container_name: unit.container().to_string(),
            failures,
            recommendation: diagnosis
                .recommendation()
                .unwrap_or(NO_RECOMMENDATION)
                .to_string(),
        })
    }
}
