mod common;

use std::sync::Arc;

use kube_triage::adapters::kubernetes::{running_pod, InMemoryCluster};
use kube_triage::domain::errors::DomainError;
use kube_triage::domain::models::{Diagnosis, WorkloadUnit};
use kube_triage::domain::ports::ClusterError;
use kube_triage::services::NO_API_KEY_PLACEHOLDER;

use common::{agent, related_issue, FakeCorrelator, FakeSynthesizer};

fn unit() -> WorkloadUnit {
    WorkloadUnit::new("default", "api-0", "app").unwrap()
}

async fn cluster_with_pod() -> InMemoryCluster {
    let cluster = InMemoryCluster::new();
    cluster.add_pod(running_pod("default", "api-0", "app")).await;
    cluster
}

#[tokio::test]
async fn test_clean_unit_reports_no_failures() {
    let cluster = cluster_with_pod().await;
    let synthesizer = Arc::new(FakeSynthesizer::returning("unused"));
    let agent = agent(
        &cluster,
        Arc::new(FakeCorrelator::returning(Vec::new())),
        synthesizer.clone(),
    );

    let diagnosis = agent.execute(&unit()).await.unwrap();
    assert_eq!(diagnosis, Diagnosis::NoFailures);
    assert_eq!(diagnosis.to_string(), "No failures detected");
    assert_eq!(synthesizer.calls(), 0);
}

#[tokio::test]
async fn test_healthy_logs_skip_enrichment() {
    let cluster = cluster_with_pod().await;
    cluster.push_log(&unit(), "listening on :8080").await;
    cluster.push_log(&unit(), "GET /healthz 200").await;
    let correlator = Arc::new(FakeCorrelator::returning(Vec::new()));
    let synthesizer = Arc::new(FakeSynthesizer::returning("unused"));
    let agent = agent(&cluster, correlator.clone(), synthesizer.clone());

    let diagnosis = agent.execute(&unit()).await.unwrap();
    assert_eq!(diagnosis.to_string(), "No failures detected");
    assert!(correlator.queries.lock().unwrap().is_empty());
    assert_eq!(synthesizer.calls(), 0);
}

#[tokio::test]
async fn test_failures_with_recommendation() {
    let cluster = cluster_with_pod().await;
    cluster.push_log(&unit(), "OOMKilled").await;
    let correlator = Arc::new(FakeCorrelator::returning(vec![related_issue(
        7,
        "api pods OOMKilled",
    )]));
    let synthesizer = Arc::new(FakeSynthesizer::returning("Raise the memory limit"));
    let agent = agent(&cluster, correlator.clone(), synthesizer.clone());

    let diagnosis = agent.execute(&unit()).await.unwrap();
    assert_eq!(
        diagnosis.to_string(),
        "Failures: [OOMKilled]\nRecommendation: Raise the memory limit"
    );

    let queries = correlator.queries.lock().unwrap().clone();
    assert_eq!(
        queries,
        vec![("api-0 oom memory".to_string(), "acme/platform".to_string())]
    );

    let evidence = synthesizer.evidence.lock().unwrap().clone();
    assert_eq!(evidence.len(), 1);
    assert!(evidence[0].contains("Pod: api-0"));
    assert!(evidence[0].contains("Failures: OOMKilled"));
    assert!(evidence[0].contains("#7 api pods OOMKilled"));
    assert!(evidence[0].contains("\"pod_status\":\"Running\""));
}

#[tokio::test]
async fn test_degraded_enrichment_keeps_failures() {
    let cluster = cluster_with_pod().await;
    cluster.push_log(&unit(), "OOMKilled").await;
    let agent = agent(
        &cluster,
        Arc::new(FakeCorrelator::failing("search unavailable")),
        Arc::new(FakeSynthesizer::failing("backend down")),
    );

    let text = agent.execute(&unit()).await.unwrap().to_string();
    assert!(text.starts_with("Failures: [OOMKilled]"));
    assert!(!text.contains("Recommendation:"));
}

#[tokio::test]
async fn test_placeholder_recommendation_is_reported() {
    let cluster = cluster_with_pod().await;
    cluster.push_log(&unit(), "OOMKilled").await;
    let agent = agent(
        &cluster,
        Arc::new(FakeCorrelator::failing("search unavailable")),
        Arc::new(FakeSynthesizer::returning(NO_API_KEY_PLACEHOLDER)),
    );

    let text = agent.execute(&unit()).await.unwrap().to_string();
    assert_eq!(
        text,
        format!("Failures: [OOMKilled]\nRecommendation: {NO_API_KEY_PLACEHOLDER}")
    );
}

#[tokio::test]
async fn test_missing_pod_is_an_error() {
    let cluster = InMemoryCluster::new();
    let synthesizer = Arc::new(FakeSynthesizer::returning("unused"));
    let agent = agent(
        &cluster,
        Arc::new(FakeCorrelator::returning(Vec::new())),
        synthesizer.clone(),
    );

    let err = agent.execute(&unit()).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::LogFetch(ClusterError::NotFound { .. })
    ));
    assert!(err.to_string().starts_with("Failed to fetch logs: "));
    assert_eq!(synthesizer.calls(), 0);
}

#[tokio::test]
async fn test_waiting_container_is_diagnosed() {
    let cluster = cluster_with_pod().await;
    cluster
        .fail_logs(
            &unit(),
            ClusterError::ContainerNotReady {
                reason: Some("ImagePullBackOff".to_string()),
                message: "container \"app\" in pod \"api-0\" is waiting to start: trying and failing to pull image".to_string(),
            },
        )
        .await;
    let agent = agent(
        &cluster,
        Arc::new(FakeCorrelator::returning(Vec::new())),
        Arc::new(FakeSynthesizer::returning("Check the image tag")),
    );

    let diagnosis = agent.execute(&unit()).await.unwrap();
    let failures = diagnosis.failures().to_vec();
    assert!(failures.iter().any(|f| f == "waiting to start"));
    assert!(failures.iter().any(|f| f == "pull image"));
    assert!(failures.iter().any(|f| f == "ImagePullBackOff"));
    assert_eq!(diagnosis.recommendation(), Some("Check the image tag"));
}

#[tokio::test]
async fn test_second_pass_without_new_output_is_clean() {
    let cluster = cluster_with_pod().await;
    cluster.push_log(&unit(), "panic: index out of range").await;
    let agent = agent(
        &cluster,
        Arc::new(FakeCorrelator::returning(Vec::new())),
        Arc::new(FakeSynthesizer::returning("Fix the bounds check")),
    );

    let first = agent.execute(&unit()).await.unwrap();
    assert!(first.has_failures());
    assert_eq!(first.failures(), ["panic:"]);

    let second = agent.execute(&unit()).await.unwrap();
    assert_eq!(second.to_string(), "No failures detected");
    assert_eq!(cluster.log_calls(), 2);
}
