//! Cluster context port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::PodContext;

/// Assembles cluster-side context for a pod.
///
/// Only a failed primary pod lookup is an error; secondary lookups
/// degrade to empty fields.
#[async_trait]
pub trait ContextSource: Send + Sync {
    /// Registry name of the implementation.
    fn name(&self) -> &'static str;

    /// Describe the pod `namespace/pod`.
    async fn gather(&self, namespace: &str, pod: &str) -> DomainResult<PodContext>;
}
