//! Log retrieval capability with per-unit watermarks.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{LogFetch, WorkloadUnit};
use crate::domain::ports::cluster::{ClusterClient, ClusterError, LogRequest};
use crate::domain::ports::LogSource;

/// Per-unit watermark. Holding its lock serializes fetches for that unit.
type UnitSlot = Arc<Mutex<Option<DateTime<Utc>>>>;

/// Fetches container logs from the cluster, remembering per unit when it last
/// read successfully so each poll only sees new output.
///
/// Watermarks live in memory and only move forward. Fetches for the same unit
/// are serialized; different units proceed in parallel. A unit that never
/// produced output is forgotten once no fetch holds it.
pub struct ClusterLogSource {
    cluster: Arc<dyn ClusterClient>,
    units: Mutex<HashMap<String, UnitSlot>>,
}

impl ClusterLogSource {
    /// Log source with no watermarks recorded yet.
    pub fn new(cluster: Arc<dyn ClusterClient>) -> Self {
        Self {
            cluster,
            units: Mutex::new(HashMap::new()),
        }
    }

    /// Last watermark recorded for `unit`.
    pub async fn watermark(&self, unit: &WorkloadUnit) -> Option<DateTime<Utc>> {
        let slot = self.units.lock().await.get(&unit.key()).cloned()?;
        let watermark = *slot.lock().await;
        watermark
    }

    /// Number of units currently tracked.
    pub async fn tracked_units(&self) -> usize {
        self.units.lock().await.len()
    }

    async fn slot(&self, unit: &WorkloadUnit) -> UnitSlot {
        self.units
            .lock()
            .await
            .entry(unit.key())
            .or_default()
            .clone()
    }

    /// Drop the slot if it holds no watermark and nobody else has it.
    async fn release(&self, unit: &WorkloadUnit, slot: UnitSlot) {
        let mut units = self.units.lock().await;
        // the map's handle and ours
        if Arc::strong_count(&slot) == 2 && slot.try_lock().is_ok_and(|w| w.is_none()) {
            units.remove(&unit.key());
        }
    }
}

fn advance(watermark: &mut Option<DateTime<Utc>>, to: DateTime<Utc>) {
    if watermark.is_none_or(|current| to > current) {
        *watermark = Some(to);
    }
}

/// Log line standing in for output the container could not produce.
fn startup_text(error: &ClusterError) -> String {
    match error {
        ClusterError::ContainerNotReady {
            reason: Some(reason),
            message,
        } if !message.to_lowercase().contains(&reason.to_lowercase()) => {
            format!("Container error: {message} (reason: {reason})")
        }
        _ => format!("Container error: {error}"),
    }
}

#[async_trait]
impl LogSource for ClusterLogSource {
    fn name(&self) -> &'static str {
        "k8s_logs"
    }

    async fn fetch(&self, unit: &WorkloadUnit, max_lines: u32) -> DomainResult<LogFetch> {
        let slot = self.slot(unit).await;
        let mut watermark = slot.lock().await;

        let since = *watermark;
        let started = Utc::now();
        let request = LogRequest {
            tail_lines: max_lines,
            since,
        };

        let result = match self.cluster.pod_logs(unit, &request).await {
            Ok(text) if text.trim().is_empty() => {
                debug!(unit = %unit, since = ?since, "no new log output");
                Ok(LogFetch::NoOutput)
            }
            Ok(text) => {
                advance(&mut watermark, started);
                Ok(LogFetch::Output(text))
            }
            Err(error) => match error.startup_condition() {
                Some(condition) => {
                    debug!(unit = %unit, %condition, %error, "container not serving logs");
                    advance(&mut watermark, started);
                    Ok(LogFetch::Startup {
                        condition,
                        text: startup_text(&error),
                    })
                }
                None => Err(DomainError::LogFetch(error)),
            },
        };

        drop(watermark);
        self.release(unit, slot).await;
        result
    }
}
