//! Kubernetes cluster adapter.
//!
//! [`KubeApiClient`] implements [`ClusterClient`](crate::domain::ports::ClusterClient)
//! over the core/v1 REST API; [`InMemoryCluster`] is the fake used by tests.

pub mod client;
pub mod mock;
pub mod models;

pub use client::KubeApiClient;
pub use mock::{running_pod, InMemoryCluster};
