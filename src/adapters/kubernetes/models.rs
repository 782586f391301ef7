//! Kubernetes core/v1 JSON payloads.
//!
//! Only the fields the triage pipeline reads are modelled; everything else
//! in the API objects is ignored during deserialization.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::ports::cluster::{
    ClusterEvent, ContainerDescriptor, NodeDescriptor, PodDescriptor, ResourceSpec, VolumeSource,
};

/// Generic `*List` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectList<T> {
    /// Listed objects.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// `metadata` block shared by every object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Object name.
    #[serde(default)]
    pub name: String,
    /// Absent on cluster-scoped objects.
    #[serde(default)]
    pub namespace: Option<String>,
}

/// A namespace; only its name is read.
#[derive(Debug, Clone, Deserialize)]
pub struct Namespace {
    /// Object metadata.
    pub metadata: ObjectMeta,
}

/// A pod as returned by `GET /api/v1/namespaces/{ns}/pods/{name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Pod {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    #[serde(default)]
    pub spec: PodSpec,
    /// Observed state.
    #[serde(default)]
    pub status: PodStatus,
}

/// Pod `spec`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    /// Set once the scheduler has placed the pod.
    #[serde(default)]
    pub node_name: Option<String>,
    /// Service account the pod runs as.
    #[serde(default)]
    pub service_account_name: Option<String>,
    /// Application containers.
    #[serde(default)]
    pub containers: Vec<Container>,
    /// Declared volumes.
    #[serde(default)]
    pub volumes: Vec<Volume>,
}

/// One container of the pod spec.
#[derive(Debug, Clone, Deserialize)]
pub struct Container {
    /// Container name.
    pub name: String,
    /// Requests and limits.
    #[serde(default)]
    pub resources: ResourceRequirements,
}

/// Quantities arrive as strings (`"128Mi"`, `"500m"`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceRequirements {
    /// Guaranteed quantities.
    #[serde(default)]
    pub requests: BTreeMap<String, String>,
    /// Hard caps.
    #[serde(default)]
    pub limits: BTreeMap<String, String>,
}

/// A volume; only secret and configMap sources are read.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    /// Secret source, if any.
    #[serde(default)]
    pub secret: Option<SecretVolumeSource>,
    /// ConfigMap source, if any.
    #[serde(default)]
    pub config_map: Option<ConfigMapVolumeSource>,
}

/// Secret-backed volume.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretVolumeSource {
    /// Secret name.
    #[serde(default)]
    pub secret_name: Option<String>,
}

/// ConfigMap-backed volume.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigMapVolumeSource {
    /// ConfigMap name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Pod `status`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodStatus {
    /// Pending, Running, Succeeded, Failed or Unknown.
    #[serde(default)]
    pub phase: Option<String>,
    /// One entry per started or waiting container.
    #[serde(default)]
    pub container_statuses: Vec<ContainerStatus>,
}

/// Observed state of one container.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerStatus {
    /// Container name.
    pub name: String,
    /// Current state.
    #[serde(default)]
    pub state: ContainerState,
}

/// Only the waiting state matters for log refusals.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerState {
    /// Set while the container has not started.
    #[serde(default)]
    pub waiting: Option<ContainerStateWaiting>,
}

/// Why a container has not started.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerStateWaiting {
    /// Machine reason such as `ImagePullBackOff`.
    #[serde(default)]
    pub reason: Option<String>,
    /// Human-readable detail.
    #[serde(default)]
    pub message: Option<String>,
}

/// A core/v1 event.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Short reason such as `BackOff`.
    #[serde(default)]
    pub reason: Option<String>,
    /// Event text.
    #[serde(default)]
    pub message: Option<String>,
}

/// A node; only its conditions are read.
#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Observed state.
    #[serde(default)]
    pub status: NodeStatus,
}

/// Node `status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeStatus {
    /// Ready, MemoryPressure and so on.
    #[serde(default)]
    pub conditions: Vec<NodeCondition>,
}

/// One node condition.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeCondition {
    /// Condition name, `type` on the wire.
    #[serde(rename = "type")]
    pub condition_type: String,
    /// `"True"`, `"False"` or `"Unknown"`.
    pub status: String,
}

/// `Status` object returned with non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Status {
    /// Human-readable failure.
    #[serde(default)]
    pub message: Option<String>,
    /// Machine reason such as `NotFound`.
    #[serde(default)]
    pub reason: Option<String>,
}

impl Pod {
    /// Waiting state of a container, if it is waiting.
    pub fn waiting_state(&self, container: &str) -> Option<&ContainerStateWaiting> {
        self.status
            .container_statuses
            .iter()
            .find(|status| status.name == container)
            .and_then(|status| status.state.waiting.as_ref())
    }
}

impl From<Pod> for PodDescriptor {
    fn from(pod: Pod) -> Self {
        let volumes = pod
            .spec
            .volumes
            .into_iter()
            .filter_map(|volume| {
                volume
                    .secret
                    .and_then(|s| s.secret_name)
                    .map(VolumeSource::Secret)
                    .or_else(|| {
                        volume
                            .config_map
                            .and_then(|c| c.name)
                            .map(VolumeSource::ConfigMap)
                    })
            })
            .collect();

        Self {
            namespace: pod.metadata.namespace.unwrap_or_default(),
            name: pod.metadata.name,
            phase: pod.status.phase.unwrap_or_else(|| "Unknown".to_string()),
            node_name: pod.spec.node_name.filter(|n| !n.is_empty()),
            service_account: pod.spec.service_account_name.filter(|n| !n.is_empty()),
            containers: pod
                .spec
                .containers
                .into_iter()
                .map(|c| ContainerDescriptor {
                    name: c.name,
                    resources: ResourceSpec {
                        requests: c.resources.requests,
                        limits: c.resources.limits,
                    },
                })
                .collect(),
            volumes,
        }
    }
}

impl From<Event> for ClusterEvent {
    fn from(event: Event) -> Self {
        Self {
            reason: event.reason.unwrap_or_default(),
            message: event.message.unwrap_or_default(),
        }
    }
}

impl From<Node> for NodeDescriptor {
    fn from(node: Node) -> Self {
        let ready = node
            .status
            .conditions
            .iter()
            .find(|c| c.condition_type == "Ready")
            .is_some_and(|c| c.status == "True");
        Self {
            name: node.metadata.name,
            ready,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pod_conversion() {
        let json = r#"{
            "metadata": { "name": "api-0", "namespace": "prod" },
            "spec": {
                "nodeName": "node-a",
                "serviceAccountName": "api",
                "containers": [
                    { "name": "app", "resources": { "limits": { "memory": "256Mi" } } },
                    { "name": "sidecar" }
                ],
                "volumes": [
                    { "name": "creds", "secret": { "secretName": "db-creds" } },
                    { "name": "cfg", "configMap": { "name": "api-config" } },
                    { "name": "scratch", "emptyDir": {} }
                ]
            },
            "status": { "phase": "Running" }
        }"#;
        let pod: Pod = serde_json::from_str(json).unwrap();
        let descriptor = PodDescriptor::from(pod);

        assert_eq!(descriptor.namespace, "prod");
        assert_eq!(descriptor.phase, "Running");
        assert_eq!(descriptor.node_name.as_deref(), Some("node-a"));
        assert_eq!(descriptor.containers.len(), 2);
        assert_eq!(
            descriptor.containers[0].resources.limits.get("memory").map(String::as_str),
            Some("256Mi")
        );
        assert!(descriptor.containers[1].resources.is_empty());
        assert_eq!(
            descriptor.volumes,
            vec![
                VolumeSource::Secret("db-creds".to_string()),
                VolumeSource::ConfigMap("api-config".to_string()),
            ]
        );
    }

    #[test]
    fn test_minimal_pending_pod() {
        let json = r#"{ "metadata": { "name": "job-1" } }"#;
        let descriptor = PodDescriptor::from(serde_json::from_str::<Pod>(json).unwrap());
        assert_eq!(descriptor.phase, "Unknown");
        assert!(descriptor.node_name.is_none());
        assert!(descriptor.containers.is_empty());
    }

    #[test]
    fn test_waiting_state_lookup() {
        let json = r#"{
            "metadata": { "name": "api-0" },
            "status": {
                "phase": "Pending",
                "containerStatuses": [
                    { "name": "app", "state": { "waiting": { "reason": "ImagePullBackOff", "message": "Back-off pulling image" } } },
                    { "name": "sidecar", "state": { "running": { "startedAt": "2024-01-01T00:00:00Z" } } }
                ]
            }
        }"#;
        let pod: Pod = serde_json::from_str(json).unwrap();
        assert_eq!(
            pod.waiting_state("app").and_then(|w| w.reason.as_deref()),
            Some("ImagePullBackOff")
        );
        assert!(pod.waiting_state("sidecar").is_none());
        assert!(pod.waiting_state("missing").is_none());
    }

    #[test]
    fn test_node_readiness() {
        let json = r#"{
            "metadata": { "name": "node-a" },
            "status": { "conditions": [
                { "type": "MemoryPressure", "status": "False" },
                { "type": "Ready", "status": "True" }
            ] }
        }"#;
        let node = NodeDescriptor::from(serde_json::from_str::<Node>(json).unwrap());
        assert!(node.ready);

        let json = r#"{ "metadata": { "name": "node-b" } }"#;
        let node = NodeDescriptor::from(serde_json::from_str::<Node>(json).unwrap());
        assert!(!node.ready);
    }
}
