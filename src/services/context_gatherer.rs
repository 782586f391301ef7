//! Cluster context capability.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Dependency, NodeInfo, PodContext};
use crate::domain::ports::cluster::{ClusterClient, PodDescriptor, VolumeSource};
use crate::domain::ports::ContextSource;

/// Gathers phase, events, resources, node readiness and dependencies for a pod.
pub struct ClusterContextSource {
    cluster: Arc<dyn ClusterClient>,
}

impl ClusterContextSource {
    /// Context source reading from `cluster`.
    pub fn new(cluster: Arc<dyn ClusterClient>) -> Self {
        Self { cluster }
    }

    async fn node_info(&self, pod: &PodDescriptor) -> NodeInfo {
        let Some(name) = pod.node_name.clone() else {
            return NodeInfo::NotScheduled;
        };
        match self.cluster.get_node(&name).await {
            Ok(node) => NodeInfo::Scheduled {
                name,
                ready: Some(node.ready),
            },
            Err(error) => {
                warn!(node = %name, %error, "node lookup failed, readiness unknown");
                NodeInfo::Scheduled { name, ready: None }
            }
        }
    }
}

fn dependencies(pod: &PodDescriptor) -> Vec<Dependency> {
    pod.service_account
        .iter()
        .map(|sa| Dependency::ServiceAccount(sa.clone()))
        .chain(pod.volumes.iter().map(|volume| match volume {
            VolumeSource::Secret(name) => Dependency::Secret(name.clone()),
            VolumeSource::ConfigMap(name) => Dependency::ConfigMap(name.clone()),
        }))
        .collect()
}

#[async_trait]
impl ContextSource for ClusterContextSource {
    fn name(&self) -> &'static str {
        "k8s_context"
    }

    async fn gather(&self, namespace: &str, pod: &str) -> DomainResult<PodContext> {
        let descriptor = self.cluster.get_pod(namespace, pod).await?;

        let (events, node_info) = tokio::join!(
            self.cluster.list_events(namespace, pod),
            self.node_info(&descriptor)
        );
        let events = events.unwrap_or_else(|error| {
            warn!(namespace, pod, %error, "event lookup failed, continuing without events");
            Vec::new()
        });

        let resources: BTreeMap<_, _> = descriptor
            .containers
            .iter()
            .filter(|c| !c.resources.is_empty())
            .map(|c| (c.name.clone(), c.resources.clone()))
            .collect();

        Ok(PodContext {
            pod_status: descriptor.phase.clone(),
            events,
            resources,
            node_info,
            dependencies: dependencies(&descriptor),
        })
    }
}
