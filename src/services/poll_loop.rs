//! Periodic driver: enumerate workload units each tick and diagnose them.
//!
//! Passes within a tick run in parallel under a semaphore. A tick finishes
//! before the next one starts; ticks that fall behind are delayed rather
//! than fired in a burst.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Diagnosis, MonitorConfig, UnitReport, WorkloadUnit};
use crate::domain::ports::ClusterClient;
use crate::services::diagnostic_agent::DiagnosticAgent;

/// Progress notifications published while the loop runs.
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// Units were enumerated and passes are starting.
    TickStarted {
        tick: u64,
        units: usize,
    },
    /// A pass found failures.
    UnitReported {
        tick: u64,
        unit: WorkloadUnit,
        diagnosis: Diagnosis,
    },
    /// A pass returned an error; the tick carries on.
    UnitFailed {
        tick: u64,
        unit: WorkloadUnit,
        error: String,
    },
    /// Every pass of the tick has finished.
    TickCompleted {
        tick: u64,
        report: TickReport,
    },
}

/// Outcome of one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// When enumeration began.
    pub started_at: DateTime<Utc>,
    /// Passes run.
    pub units_checked: usize,
    /// Passes that found nothing.
    pub units_clean: usize,
    /// Passes that returned an error.
    pub units_errored: usize,
    /// Units with failures, sorted by namespace, pod and container.
    pub reports: Vec<UnitReport>,
}

/// Tick driver over a cluster and a diagnostic agent.
#[derive(Clone)]
pub struct PollLoop {
    /// Source of namespaces and pods.
    cluster: Arc<dyn ClusterClient>,
    /// Runs each pass.
    agent: DiagnosticAgent,
    /// Watched namespaces; empty means all.
    namespaces: Vec<String>,
    /// Time between tick starts.
    interval: Duration,
    /// Passes allowed in flight at once.
    concurrency: usize,
    /// Event sink, if anyone listens.
    events: Option<mpsc::Sender<PollEvent>>,
}

impl PollLoop {
    /// Loop over the namespaces, interval and concurrency in `monitor`.
    pub fn new(
        cluster: Arc<dyn ClusterClient>,
        agent: DiagnosticAgent,
        monitor: &MonitorConfig,
    ) -> Self {
        Self {
            cluster,
            agent,
            namespaces: monitor.namespaces.clone(),
            interval: Duration::from_secs(monitor.interval_secs.max(1)),
            concurrency: monitor.concurrency.max(1),
            events: None,
        }
    }

    /// Publish [`PollEvent`]s on `events`.
    #[must_use]
    pub fn with_events(mut self, events: mpsc::Sender<PollEvent>) -> Self {
        self.events = Some(events);
        self
    }

    async fn publish(&self, event: PollEvent) {
        if let Some(events) = &self.events {
            // a closed receiver only means nobody is listening
            let _ = events.send(event).await;
        }
    }

    /// Every container of every pod in the watched namespaces.
    ///
    /// An empty namespace list means all namespaces. A namespace whose pods
    /// cannot be listed is skipped.
    pub async fn enumerate_units(&self) -> DomainResult<Vec<WorkloadUnit>> {
        let namespaces = if self.namespaces.is_empty() {
            self.cluster.list_namespaces().await?
        } else {
            self.namespaces.clone()
        };

        let mut units = Vec::new();
        for namespace in &namespaces {
            let pods = match self.cluster.list_pods(namespace).await {
                Ok(pods) => pods,
                Err(error) => {
                    warn!(namespace = %namespace, %error, "cannot list pods, skipping namespace");
                    continue;
                }
            };
            for pod in pods {
                for container in &pod.containers {
                    match WorkloadUnit::new(namespace.as_str(), pod.name.as_str(), container.name.as_str()) {
                        Ok(unit) => units.push(unit),
                        Err(error) => debug!(pod = %pod.name, %error, "skipping unit"),
                    }
                }
            }
        }
        Ok(units)
    }

    /// Enumerate and diagnose every unit once.
    pub async fn run_tick(&self, tick: u64) -> DomainResult<TickReport> {
        let started_at = Utc::now();
        let units = self.enumerate_units().await?;
        info!(tick, units = units.len(), "tick started");
        self.publish(PollEvent::TickStarted {
            tick,
            units: units.len(),
        })
        .await;

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut passes = JoinSet::new();
        for unit in units.iter().cloned() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| DomainError::Configuration(format!("poll semaphore closed: {e}")))?;
            let agent = self.agent.clone();
            passes.spawn(async move {
                let result = agent.execute(&unit).await;
                drop(permit);
                (unit, result)
            });
        }

        let mut report = TickReport {
            tick,
            started_at,
            units_checked: units.len(),
            units_clean: 0,
            units_errored: 0,
            reports: Vec::new(),
        };

        while let Some(joined) = passes.join_next().await {
            let (unit, result) = match joined {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    error!(tick, error = %join_error, "diagnostic pass panicked");
                    report.units_errored += 1;
                    continue;
                }
            };
            match result {
                Ok(diagnosis) => match UnitReport::from_diagnosis(&unit, &diagnosis) {
                    Some(row) => {
                        info!(tick, unit = %unit, failures = diagnosis.failures().len(), "failures reported");
                        report.reports.push(row);
                        self.publish(PollEvent::UnitReported {
                            tick,
                            unit,
                            diagnosis,
                        })
                        .await;
                    }
                    None => report.units_clean += 1,
                },
                Err(error) => {
                    warn!(tick, unit = %unit, %error, "diagnostic pass failed");
                    report.units_errored += 1;
                    self.publish(PollEvent::UnitFailed {
                        tick,
                        unit,
                        error: error.to_string(),
                    })
                    .await;
                }
            }
        }

        report.reports.sort_by(|a, b| {
            (&a.namespace, &a.pod_name, &a.container_name).cmp(&(
                &b.namespace,
                &b.pod_name,
                &b.container_name,
            ))
        });

        info!(
            tick,
            checked = report.units_checked,
            reported = report.reports.len(),
            errored = report.units_errored,
            "tick completed"
        );
        self.publish(PollEvent::TickCompleted {
            tick,
            report: report.clone(),
        })
        .await;
        Ok(report)
    }

    /// Run ticks until the returned handle is stopped.
    ///
    /// The first tick starts immediately.
    pub fn spawn(self) -> PollHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut tick = 0_u64;
            loop {
                tokio::select! {
                    _ = stop_rx.changed() => break,
                    _ = interval.tick() => {}
                }
                tick += 1;
                if let Err(error) = self.run_tick(tick).await {
                    warn!(tick, %error, "tick failed");
                }
                if *stop_rx.borrow() {
                    break;
                }
            }
            debug!(ticks = tick, "poll loop stopped");
        });
        PollHandle {
            stop: stop_tx,
            task,
        }
    }
}

/// Control handle for a spawned [`PollLoop`].
pub struct PollHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Ask the loop to stop after the current tick.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }

    /// Wait for the loop task to exit.
    pub async fn join(self) {
        if let Err(error) = self.task.await {
            error!(%error, "poll loop task failed");
        }
    }
}
