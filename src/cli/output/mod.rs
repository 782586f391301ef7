//! CLI output formatting
//!
//! Every command result implements [`CommandOutput`] and is printed by
//! [`output`] as human text or pretty JSON.

pub mod table;

use console::style;
use serde::Serialize;
use serde_json::json;

use crate::domain::models::{Config, Diagnosis, UnitReport, WorkloadUnit};
use crate::services::TickReport;

pub use table::{truncate_text, TableFormatter};

/// Result of a command, printable as text or JSON.
pub trait CommandOutput: Serialize {
    /// Text for a terminal.
    fn to_human(&self) -> String;

    /// JSON form; the serialized value by default.
    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Print `result` in the selected mode.
pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&result.to_json()).unwrap_or_default()
        );
    } else {
        println!("{}", result.to_human());
    }
}

/// Verdict of `diagnose`.
#[derive(Debug, Serialize)]
pub struct DiagnoseOutput {
    /// Diagnosed container.
    pub unit: WorkloadUnit,
    /// Verdict text exactly as the agent phrases it.
    pub result: String,
    /// Failure fragments, empty for a clean unit.
    pub failures: Vec<String>,
    /// Advice, when there was any.
    pub recommendation: Option<String>,
}

impl DiagnoseOutput {
    /// Output for `diagnosis` of `unit`.
    pub fn new(unit: WorkloadUnit, diagnosis: &Diagnosis) -> Self {
        Self {
            unit,
            result: diagnosis.to_string(),
            failures: diagnosis.failures().to_vec(),
            recommendation: diagnosis.recommendation().map(str::to_string),
        }
    }
}

impl CommandOutput for DiagnoseOutput {
    fn to_human(&self) -> String {
        self.result.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        json!({
            "namespace": self.unit.namespace(),
            "pod_name": self.unit.pod(),
            "container_name": self.unit.container(),
            "result": self.result,
            "failures": self.failures,
            "recommendation": self.recommendation,
        })
    }
}

/// Result of `scan`: one tick's report.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ScanOutput(pub TickReport);

impl CommandOutput for ScanOutput {
    fn to_human(&self) -> String {
        let report = &self.0;
        let summary = format!(
            "Checked {} container{}: {} with failures, {} clean, {} errored",
            report.units_checked,
            if report.units_checked == 1 { "" } else { "s" },
            style(report.reports.len()).bold(),
            report.units_clean,
            report.units_errored,
        );
        if report.reports.is_empty() {
            return format!("{summary}\n{}", style("No failures detected").green());
        }
        format!(
            "{}\n{summary}",
            TableFormatter::new().format_reports(&report.reports)
        )
    }
}

/// Effective configuration, secrets redacted.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ConfigOutput(pub Config);

impl ConfigOutput {
    /// Wrap a copy of `config` with credentials masked.
    pub fn redacted(config: &Config) -> Self {
        Self(config.redacted())
    }
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        serde_yaml::to_string(&self.0).unwrap_or_default()
    }
}

/// One line per reported unit, used by `watch`.
pub fn unit_line(row: &UnitReport) -> String {
    format!(
        "{} {}/{}/{} {}\n  {} {}",
        style("✗").red().bold(),
        row.namespace,
        row.pod_name,
        row.container_name,
        style(&row.failures).red(),
        style("Recommendation:").dim(),
        row.recommendation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_diagnose_output_keeps_verdict_text() {
        let unit = WorkloadUnit::new("default", "api-0", "app").unwrap();
        let out = DiagnoseOutput::new(unit.clone(), &Diagnosis::NoFailures);
        assert_eq!(out.to_human(), "No failures detected");

        let out = DiagnoseOutput::new(
            unit,
            &Diagnosis::Failures {
                failures: vec!["OOMKilled".to_string()],
                recommendation: None,
            },
        );
        assert_eq!(out.to_human(), "Failures: [OOMKilled]");
        let value = out.to_json();
        assert_eq!(value["pod_name"], "api-0");
        assert_eq!(value["failures"][0], "OOMKilled");
        assert!(value["recommendation"].is_null());
    }

    #[test]
    fn test_scan_output_json_shape() {
        let report = TickReport {
            tick: 1,
            started_at: Utc::now(),
            units_checked: 2,
            units_clean: 1,
            units_errored: 0,
            reports: vec![UnitReport {
                namespace: "default".to_string(),
                pod_name: "api-0".to_string(),
                container_name: "app".to_string(),
                failures: "Failures: [evicted]".to_string(),
                recommendation: "No recommendation available".to_string(),
            }],
        };
        let value = ScanOutput(report).to_json();
        assert_eq!(value["units_checked"], 2);
        let row = &value["reports"][0];
        assert_eq!(row["namespace"], "default");
        assert_eq!(row["pod_name"], "api-0");
        assert_eq!(row["container_name"], "app");
        assert_eq!(row["failures"], "Failures: [evicted]");
        assert_eq!(row["recommendation"], "No recommendation available");
    }

    #[test]
    fn test_config_output_is_redacted() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-live-123".to_string());
        let rendered = ConfigOutput::redacted(&config).to_human();
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("sk-live-123"));
    }
}
