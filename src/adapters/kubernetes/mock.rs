//! In-memory cluster for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::models::WorkloadUnit;
use crate::domain::ports::cluster::{
    ClusterClient, ClusterError, ClusterEvent, LogRequest, NodeDescriptor, PodDescriptor,
};

/// One log line with the instant it was written.
#[derive(Debug, Clone)]
struct LogLine {
    at: DateTime<Utc>,
    text: String,
}

#[derive(Debug, Default)]
struct State {
    namespaces: Vec<String>,
    pods: HashMap<(String, String), PodDescriptor>,
    logs: HashMap<String, Vec<LogLine>>,
    log_errors: HashMap<String, ClusterError>,
    events: HashMap<(String, String), Vec<ClusterEvent>>,
    nodes: HashMap<String, NodeDescriptor>,
    events_error: Option<ClusterError>,
    nodes_error: Option<ClusterError>,
    log_requests: Vec<LogRequest>,
}

/// Cluster fake that honours `tailLines` and `sinceTime` like the real API.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCluster {
    state: Arc<RwLock<State>>,
    log_calls: Arc<AtomicUsize>,
}

impl InMemoryCluster {
    /// Empty cluster with no namespaces.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a namespace with no pods.
    pub async fn add_namespace(&self, namespace: impl Into<String>) {
        self.state.write().await.namespaces.push(namespace.into());
    }

    /// Register a pod; its namespace is added if unknown.
    pub async fn add_pod(&self, pod: PodDescriptor) {
        let mut state = self.state.write().await;
        if !state.namespaces.contains(&pod.namespace) {
            state.namespaces.push(pod.namespace.clone());
        }
        state
            .pods
            .insert((pod.namespace.clone(), pod.name.clone()), pod);
    }

    /// Append a log line written at `at`.
    pub async fn push_log_at(&self, unit: &WorkloadUnit, at: DateTime<Utc>, text: impl Into<String>) {
        self.state
            .write()
            .await
            .logs
            .entry(unit.key())
            .or_default()
            .push(LogLine {
                at,
                text: text.into(),
            });
    }

    /// Append a log line written one minute ago.
    pub async fn push_log(&self, unit: &WorkloadUnit, text: impl Into<String>) {
        self.push_log_at(unit, Utc::now() - chrono::Duration::minutes(1), text)
            .await;
    }

    /// Make every log request for `unit` fail with `error`.
    pub async fn fail_logs(&self, unit: &WorkloadUnit, error: ClusterError) {
        self.state.write().await.log_errors.insert(unit.key(), error);
    }

    /// Attach an event to `involved_object` in `namespace`.
    pub async fn add_event(&self, namespace: &str, involved_object: &str, event: ClusterEvent) {
        self.state
            .write()
            .await
            .events
            .entry((namespace.to_string(), involved_object.to_string()))
            .or_default()
            .push(event);
    }

    /// Register a node, replacing any with the same name.
    pub async fn add_node(&self, node: NodeDescriptor) {
        self.state.write().await.nodes.insert(node.name.clone(), node);
    }

    /// Make every event listing fail with `error`.
    pub async fn fail_events(&self, error: ClusterError) {
        self.state.write().await.events_error = Some(error);
    }

    /// Make every node lookup fail with `error`.
    pub async fn fail_nodes(&self, error: ClusterError) {
        self.state.write().await.nodes_error = Some(error);
    }

    /// Number of `pod_logs` calls served so far.
    pub fn log_calls(&self) -> usize {
        self.log_calls.load(Ordering::SeqCst)
    }

    /// Every log request received, in order.
    pub async fn log_requests(&self) -> Vec<LogRequest> {
        self.state.read().await.log_requests.clone()
    }
}

#[async_trait]
impl ClusterClient for InMemoryCluster {
    async fn list_namespaces(&self) -> Result<Vec<String>, ClusterError> {
        Ok(self.state.read().await.namespaces.clone())
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodDescriptor>, ClusterError> {
        let state = self.state.read().await;
        let mut pods: Vec<PodDescriptor> = state
            .pods
            .values()
            .filter(|pod| pod.namespace == namespace)
            .cloned()
            .collect();
        pods.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(pods)
    }

    async fn pod_logs(
        &self,
        unit: &WorkloadUnit,
        request: &LogRequest,
    ) -> Result<String, ClusterError> {
        self.log_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().await;
        state.log_requests.push(request.clone());

        if let Some(error) = state.log_errors.get(&unit.key()) {
            return Err(error.clone());
        }
        if !state
            .pods
            .contains_key(&(unit.namespace().to_string(), unit.pod().to_string()))
        {
            return Err(ClusterError::NotFound {
                kind: "pods".to_string(),
                name: unit.pod().to_string(),
            });
        }

        let lines: Vec<&str> = state
            .logs
            .get(&unit.key())
            .map(|lines| {
                lines
                    .iter()
                    .filter(|line| request.since.is_none_or(|since| line.at >= since))
                    .map(|line| line.text.as_str())
                    .collect()
            })
            .unwrap_or_default();

        let skip = lines.len().saturating_sub(request.tail_lines as usize);
        Ok(lines[skip..]
            .iter()
            .map(|line| format!("{line}\n"))
            .collect())
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<PodDescriptor, ClusterError> {
        self.state
            .read()
            .await
            .pods
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| ClusterError::NotFound {
                kind: "pods".to_string(),
                name: name.to_string(),
            })
    }

    async fn list_events(
        &self,
        namespace: &str,
        involved_object: &str,
    ) -> Result<Vec<ClusterEvent>, ClusterError> {
        let state = self.state.read().await;
        if let Some(error) = &state.events_error {
            return Err(error.clone());
        }
        Ok(state
            .events
            .get(&(namespace.to_string(), involved_object.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_node(&self, name: &str) -> Result<NodeDescriptor, ClusterError> {
        let state = self.state.read().await;
        if let Some(error) = &state.nodes_error {
            return Err(error.clone());
        }
        state
            .nodes
            .get(name)
            .cloned()
            .ok_or_else(|| ClusterError::NotFound {
                kind: "nodes".to_string(),
                name: name.to_string(),
            })
    }
}

/// A running single-container pod scheduled to `node-1`.
pub fn running_pod(namespace: &str, name: &str, container: &str) -> PodDescriptor {
    use crate::domain::ports::cluster::{ContainerDescriptor, ResourceSpec};

    PodDescriptor {
        namespace: namespace.to_string(),
        name: name.to_string(),
        phase: "Running".to_string(),
        node_name: Some("node-1".to_string()),
        service_account: None,
        containers: vec![ContainerDescriptor {
            name: container.to_string(),
            resources: ResourceSpec::default(),
        }],
        volumes: Vec::new(),
    }
}
