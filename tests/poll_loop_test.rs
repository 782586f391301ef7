mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kube_triage::adapters::kubernetes::{running_pod, InMemoryCluster};
use kube_triage::domain::errors::DomainResult;
use kube_triage::domain::models::{LogFetch, MonitorConfig, WorkloadUnit};
use kube_triage::domain::ports::{ClusterError, LogSource};
use kube_triage::services::{
    AgentSettings, ClusterContextSource, DiagnosticAgent, PollEvent, PollLoop,
    SignatureClassifier,
};
use tokio::sync::mpsc;

use common::{agent, FakeCorrelator, FakeSynthesizer};

fn monitor(namespaces: &[&str], concurrency: usize) -> MonitorConfig {
    MonitorConfig {
        namespaces: namespaces.iter().map(|ns| (*ns).to_string()).collect(),
        concurrency,
        interval_secs: 1,
        ..MonitorConfig::default()
    }
}

fn unit(ns: &str, pod: &str) -> WorkloadUnit {
    WorkloadUnit::new(ns, pod, "app").unwrap()
}

fn default_agent(cluster: &InMemoryCluster) -> DiagnosticAgent {
    agent(
        cluster,
        Arc::new(FakeCorrelator::returning(Vec::new())),
        Arc::new(FakeSynthesizer::returning("Restart the pod")),
    )
}

#[tokio::test]
async fn test_tick_reports_failing_units_only() {
    let cluster = InMemoryCluster::new();
    for pod in ["api-0", "api-1", "worker-0"] {
        cluster.add_pod(running_pod("default", pod, "app")).await;
    }
    cluster.push_log(&unit("default", "api-1"), "connection refused").await;
    cluster.push_log(&unit("default", "api-0"), "all good").await;
    cluster
        .fail_logs(&unit("default", "worker-0"), ClusterError::Timeout)
        .await;

    let poll = PollLoop::new(
        Arc::new(cluster.clone()),
        default_agent(&cluster),
        &monitor(&["default"], 2),
    );
    let report = poll.run_tick(1).await.unwrap();

    assert_eq!(report.tick, 1);
    assert_eq!(report.units_checked, 3);
    assert_eq!(report.units_clean, 1);
    assert_eq!(report.units_errored, 1);
    assert_eq!(report.reports.len(), 1);
    let row = &report.reports[0];
    assert_eq!(row.pod_name, "api-1");
    assert_eq!(row.failures, "Failures: [connection refused]");
    assert_eq!(row.recommendation, "Restart the pod");
}

#[tokio::test]
async fn test_empty_namespace_list_enumerates_cluster() {
    let cluster = InMemoryCluster::new();
    cluster.add_pod(running_pod("prod", "api-0", "app")).await;
    cluster.add_pod(running_pod("staging", "api-0", "app")).await;
    cluster.add_namespace("empty").await;

    let poll = PollLoop::new(
        Arc::new(cluster.clone()),
        default_agent(&cluster),
        &monitor(&[], 4),
    );
    let units = poll.enumerate_units().await.unwrap();
    assert_eq!(units, vec![unit("prod", "api-0"), unit("staging", "api-0")]);
}

#[tokio::test]
async fn test_configured_namespaces_limit_enumeration() {
    let cluster = InMemoryCluster::new();
    cluster.add_pod(running_pod("prod", "api-0", "app")).await;
    cluster.add_pod(running_pod("staging", "api-0", "app")).await;

    let poll = PollLoop::new(
        Arc::new(cluster.clone()),
        default_agent(&cluster),
        &monitor(&["staging"], 4),
    );
    let units = poll.enumerate_units().await.unwrap();
    assert_eq!(units, vec![unit("staging", "api-0")]);
}

/// Log source that records how many fetches overlap.
struct SlowLogSource {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl LogSource for SlowLogSource {
    fn name(&self) -> &'static str {
        "slow_logs"
    }

    async fn fetch(&self, _unit: &WorkloadUnit, _max_lines: u32) -> DomainResult<LogFetch> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(LogFetch::NoOutput)
    }
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let cluster = InMemoryCluster::new();
    for i in 0..8 {
        cluster
            .add_pod(running_pod("default", &format!("api-{i}"), "app"))
            .await;
    }
    let logs = Arc::new(SlowLogSource {
        in_flight: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });
    let agent = DiagnosticAgent::new(
        logs.clone(),
        Arc::new(SignatureClassifier::standard().unwrap()),
        Arc::new(ClusterContextSource::new(Arc::new(cluster.clone()))),
        Arc::new(FakeCorrelator::returning(Vec::new())),
        Arc::new(FakeSynthesizer::returning("unused")),
        AgentSettings::default(),
    );

    let poll = PollLoop::new(Arc::new(cluster), agent, &monitor(&["default"], 3));
    let report = poll.run_tick(1).await.unwrap();

    assert_eq!(report.units_checked, 8);
    assert_eq!(report.units_clean, 8);
    assert!(logs.peak.load(Ordering::SeqCst) <= 3);
    assert!(logs.peak.load(Ordering::SeqCst) >= 1);
}

#[tokio::test]
async fn test_spawned_loop_publishes_events_and_stops() {
    let cluster = InMemoryCluster::new();
    cluster.add_pod(running_pod("default", "api-0", "app")).await;
    cluster.push_log(&unit("default", "api-0"), "OOMKilled").await;

    let (tx, mut rx) = mpsc::channel(16);
    let handle = PollLoop::new(
        Arc::new(cluster.clone()),
        default_agent(&cluster),
        &monitor(&["default"], 1),
    )
    .with_events(tx)
    .spawn();

    let mut seen = Vec::new();
    while let Some(event) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
    {
        let done = matches!(event, PollEvent::TickCompleted { .. });
        seen.push(event);
        if done {
            break;
        }
    }
    handle.stop();
    tokio::time::timeout(Duration::from_secs(5), handle.join())
        .await
        .unwrap();

    assert!(matches!(seen[0], PollEvent::TickStarted { tick: 1, units: 1 }));
    let PollEvent::UnitReported { unit, diagnosis, .. } = &seen[1] else {
        panic!("expected a unit report, got {:?}", seen[1]);
    };
    assert_eq!(unit.pod(), "api-0");
    assert_eq!(
        diagnosis.to_string(),
        "Failures: [OOMKilled]\nRecommendation: Restart the pod"
    );
    let PollEvent::TickCompleted { report, .. } = &seen[2] else {
        panic!("expected tick completion, got {:?}", seen[2]);
    };
    assert_eq!(report.reports.len(), 1);
}
