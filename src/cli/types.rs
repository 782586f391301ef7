//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::models::Config;

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "kube-triage")]
#[command(about = "Kubernetes workload failure triage", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (replaces .kube-triage/config.yaml and local.yaml)
    #[arg(short, long, global = true, env = "KUBE_TRIAGE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Poll the cluster periodically and report failing containers until Ctrl-C
    Watch {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Seconds between ticks (overrides monitor.interval_secs)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Run a single tick and print a report
    Scan {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Diagnose one container
    Diagnose {
        /// Namespace of the pod
        namespace: String,

        /// Pod name
        pod: String,

        /// Container name
        container: String,
    },

    /// Print the effective configuration with secrets redacted
    Config,
}

/// Namespace selection shared by `watch` and `scan`.
#[derive(Args, Debug, Clone, Default)]
pub struct ScopeArgs {
    /// Namespace to poll; repeat for several (overrides monitor.namespaces)
    #[arg(short, long = "namespace")]
    pub namespaces: Vec<String>,

    /// Poll every namespace in the cluster
    #[arg(short = 'A', long, conflicts_with = "namespaces")]
    pub all_namespaces: bool,

    /// Diagnostic passes run in parallel (overrides monitor.concurrency)
    #[arg(long)]
    pub concurrency: Option<usize>,
}

impl ScopeArgs {
    /// Fold the flags into the monitor section.
    pub fn apply(&self, config: &mut Config) {
        if self.all_namespaces {
            config.monitor.namespaces.clear();
        } else if !self.namespaces.is_empty() {
            config.monitor.namespaces.clone_from(&self.namespaces);
        }
        if let Some(concurrency) = self.concurrency {
            config.monitor.concurrency = concurrency.max(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_diagnose() {
        let cli = Cli::try_parse_from(["kube-triage", "--json", "diagnose", "prod", "api-0", "app"])
            .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Diagnose {
                namespace,
                pod,
                container,
            } => {
                assert_eq!(namespace, "prod");
                assert_eq!(pod, "api-0");
                assert_eq!(container, "app");
            }
            _ => panic!("expected diagnose"),
        }
    }

    #[test]
    fn test_scope_overrides() {
        let cli = Cli::try_parse_from(["kube-triage", "scan", "-n", "a", "-n", "b"]).unwrap();
        let Commands::Scan { scope } = cli.command else {
            panic!("expected scan");
        };
        let mut config = Config::default();
        scope.apply(&mut config);
        assert_eq!(config.monitor.namespaces, vec!["a", "b"]);

        let cli = Cli::try_parse_from(["kube-triage", "watch", "-A", "--interval", "5"]).unwrap();
        let Commands::Watch { scope, interval } = cli.command else {
            panic!("expected watch");
        };
        let mut config = Config::default();
        scope.apply(&mut config);
        assert!(config.monitor.namespaces.is_empty());
        assert_eq!(interval, Some(5));
    }

    #[test]
    fn test_all_namespaces_conflicts_with_namespace() {
        assert!(Cli::try_parse_from(["kube-triage", "scan", "-A", "-n", "x"]).is_err());
    }
}
