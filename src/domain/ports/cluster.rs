//! Cluster port - the boundary to the container orchestration API.
//!
//! Everything the pipeline needs from the cluster is expressed here in
//! domain terms. Adapters translate their wire formats into these types and
//! their failures into [`ClusterError`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::models::{StartupCondition, WorkloadUnit};

/// Errors reported by a cluster collaborator.
///
/// `ContainerNotReady` is the structured startup signal: the API refused to
/// serve logs and the pod status shows the container waiting. `reason` is the
/// waiting reason from the container status (e.g. `ImagePullBackOff`) and
/// `message` the API's own explanation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClusterError {
    #[error("{message}")]
    ContainerNotReady {
        reason: Option<String>,
        message: String,
    },

    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: String, name: String },

    #[error("cluster API returned {status} ({reason}): {message}")]
    Api {
        status: u16,
        reason: String,
        message: String,
    },

    #[error("cluster request timed out")]
    Timeout,

    #[error("cluster transport error: {0}")]
    Transport(String),

    #[error("cluster response decode failed: {0}")]
    Decode(String),
}

impl ClusterError {
    /// The startup condition this error describes, if any.
    ///
    /// A waiting container is always a startup condition: its reason decides
    /// which one, then its message, then `WaitingToStart`. Generic API errors
    /// are matched on their message only. Missing objects, timeouts,
    /// transport and decode failures are never startup conditions.
    pub fn startup_condition(&self) -> Option<StartupCondition> {
        match self {
            Self::ContainerNotReady { reason, message } => Some(
                reason
                    .as_deref()
                    .and_then(StartupCondition::from_waiting_reason)
                    .or_else(|| StartupCondition::classify(message))
                    .unwrap_or(StartupCondition::WaitingToStart),
            ),
            Self::Api { message, .. } => StartupCondition::classify(message),
            Self::NotFound { .. } | Self::Timeout | Self::Transport(_) | Self::Decode(_) => None,
        }
    }
}

/// Bounds for a log request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRequest {
    /// Maximum number of trailing lines.
    pub tail_lines: u32,
    /// Only return output produced after this instant.
    pub since: Option<DateTime<Utc>>,
}

/// Resource requests and limits for one container, as quantity strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    /// Requested quantities by resource name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requests: BTreeMap<String, String>,
    /// Limits by resource name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub limits: BTreeMap<String, String>,
}

impl ResourceSpec {
    /// Neither requests nor limits are set.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty() && self.limits.is_empty()
    }
}

/// A container of a pod descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDescriptor {
    /// Container name.
    pub name: String,
    /// Requests and limits.
    pub resources: ResourceSpec,
}

/// Volume sources the pipeline cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeSource {
    /// Secret name.
    Secret(String),
    /// ConfigMap name.
    ConfigMap(String),
}

/// The subset of a pod descriptor used for diagnosis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodDescriptor {
    /// Namespace of the pod.
    pub namespace: String,
    /// Pod name.
    pub name: String,
    /// Lifecycle phase: Pending, Running, Succeeded, Failed, Unknown.
    pub phase: String,
    /// Node the pod is scheduled to, if any.
    pub node_name: Option<String>,
    /// Service account, if set.
    pub service_account: Option<String>,
    /// Containers in spec order.
    pub containers: Vec<ContainerDescriptor>,
    /// Secret and config map volumes only.
    pub volumes: Vec<VolumeSource>,
}

/// An event recorded against a pod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterEvent {
    /// Short reason such as `BackOff`.
    pub reason: String,
    /// Event text.
    pub message: String,
}

/// A node and its Ready condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    /// Node name.
    pub name: String,
    /// `true` when the Ready condition is `"True"`.
    pub ready: bool,
}

/// Operations consumed from the cluster API.
///
/// Every call may be slow or fail; implementations must bound each call
/// with a timeout.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// List all namespace names.
    async fn list_namespaces(&self) -> Result<Vec<String>, ClusterError>;

    /// List pods in a namespace.
    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodDescriptor>, ClusterError>;

    /// Read log output for one container.
    async fn pod_logs(
        &self,
        unit: &WorkloadUnit,
        request: &LogRequest,
    ) -> Result<String, ClusterError>;

    /// Read a single pod descriptor.
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<PodDescriptor, ClusterError>;

    /// List events whose involved object has the given name.
    async fn list_events(
        &self,
        namespace: &str,
        involved_object: &str,
    ) -> Result<Vec<ClusterEvent>, ClusterError>;

    /// Read a node descriptor.
    async fn get_node(&self, name: &str) -> Result<NodeDescriptor, ClusterError>;
}
