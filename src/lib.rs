//! kube-triage - Kubernetes workload failure triage
//!
//! For every container of every watched pod, a diagnostic pass fetches new
//! log output, matches it against a catalog of failure signatures and, when
//! something matches, enriches the evidence with cluster context and related
//! GitHub issues before asking a generative backend for remediation advice.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, port traits and the error taxonomy
//! - **Adapter Layer** (`adapters`): Kubernetes, GitHub and chat-completions HTTP clients
//! - **Service Layer** (`services`): the five capabilities, the registry, the agent and the poll loop
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use kube_triage::adapters::kubernetes::KubeApiClient;
//! use kube_triage::domain::models::{Config, WorkloadUnit};
//! use kube_triage::services::standard_agent;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let cluster = Arc::new(KubeApiClient::new(&config.cluster)?);
//!     let agent = standard_agent(&config, cluster)?;
//!     let unit = WorkloadUnit::new("default", "api-0", "app")?;
//!     println!("{}", agent.execute(&unit).await?);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{Config, Diagnosis, WorkloadUnit};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{CapabilityRegistry, DiagnosticAgent, PollLoop};
