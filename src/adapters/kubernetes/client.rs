//! Kubernetes REST client.
//!
//! Talks to the core/v1 API directly over HTTP, either through a local
//! `kubectl proxy` (the default) or against an API server with a bearer
//! token and an optional private CA bundle.

use std::time::Duration;

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ClusterConfig, WorkloadUnit};
use crate::domain::ports::cluster::{
    ClusterClient, ClusterError, ClusterEvent, LogRequest, NodeDescriptor, PodDescriptor,
};
use crate::infrastructure::logging::SecretScrubber;

use super::models::{Event, Namespace, Node, ObjectList, Pod, Status};

/// HTTP client for the Kubernetes core/v1 API.
#[derive(Debug, Clone)]
pub struct KubeApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    scrubber: SecretScrubber,
}

impl KubeApiClient {
    /// Build a client from the cluster section of the configuration.
    ///
    /// A `token` takes precedence over `token_file`. The file is read once,
    /// here; rotated service account tokens need a restart.
    pub fn new(config: &ClusterConfig) -> DomainResult<Self> {
        let mut builder =
            Client::builder().timeout(Duration::from_secs(config.request_timeout_secs));

        if let Some(path) = &config.ca_cert {
            let pem = std::fs::read(path).map_err(|e| {
                DomainError::Configuration(format!("cannot read CA bundle {path}: {e}"))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                DomainError::Configuration(format!("invalid CA bundle {path}: {e}"))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        let token = match (&config.token, &config.token_file) {
            (Some(token), _) if !token.trim().is_empty() => Some(token.trim().to_string()),
            (_, Some(path)) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    DomainError::Configuration(format!("cannot read token file {path}: {e}"))
                })?;
                Some(raw.trim().to_string()).filter(|t| !t.is_empty())
            }
            _ => None,
        };

        let http = builder
            .build()
            .map_err(|e| DomainError::Configuration(format!("cluster HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token,
            scrubber: SecretScrubber::new(),
        })
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.http.get(format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        kind: &str,
        name: &str,
    ) -> Result<Response, ClusterError> {
        let response = request.send().await.map_err(|e| self.transport_error(&e))?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(self.error_from_response(response, kind, name).await)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        kind: &str,
        name: &str,
    ) -> Result<T, ClusterError> {
        let response = self
            .send(self.request(path).query(query), kind, name)
            .await?;
        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                ClusterError::Timeout
            } else {
                ClusterError::Decode(format!("{kind} {name}: {e}"))
            }
        })
    }

    async fn fetch_pod(&self, namespace: &str, name: &str) -> Result<Pod, ClusterError> {
        self.get_json(
            &format!("/api/v1/namespaces/{namespace}/pods/{name}"),
            &[],
            "pods",
            name,
        )
        .await
    }

    fn transport_error(&self, err: &reqwest::Error) -> ClusterError {
        if err.is_timeout() {
            ClusterError::Timeout
        } else {
            ClusterError::Transport(self.scrubber.scrub(&err.to_string()))
        }
    }

    async fn error_from_response(&self, response: Response, kind: &str, name: &str) -> ClusterError {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return ClusterError::NotFound {
                kind: kind.to_string(),
                name: name.to_string(),
            };
        }
        let body = response.text().await.unwrap_or_default();
        let parsed: Status = serde_json::from_str(&body).unwrap_or_default();
        ClusterError::Api {
            status: status.as_u16(),
            reason: parsed
                .reason
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_default(),
            message: self.scrubber.scrub(&parsed.message.unwrap_or(body)),
        }
    }

    /// Turn a 400 from the log endpoint into `ContainerNotReady` when the
    /// container status confirms it is waiting.
    async fn explain_log_refusal(&self, unit: &WorkloadUnit, error: ClusterError) -> ClusterError {
        let message = match &error {
            ClusterError::Api {
                status: 400,
                message,
                ..
            } => message.clone(),
            _ => return error,
        };

        match self.fetch_pod(unit.namespace(), unit.pod()).await {
            Ok(pod) => match pod.waiting_state(unit.container()) {
                Some(waiting) => ClusterError::ContainerNotReady {
                    reason: waiting.reason.clone(),
                    message,
                },
                None => error,
            },
            Err(lookup) => {
                tracing::debug!(
                    namespace = unit.namespace(),
                    pod = unit.pod(),
                    error = %lookup,
                    "pod status lookup after log refusal failed"
                );
                error
            }
        }
    }
}

#[async_trait]
impl ClusterClient for KubeApiClient {
    async fn list_namespaces(&self) -> Result<Vec<String>, ClusterError> {
        let list: ObjectList<Namespace> = self
            .get_json("/api/v1/namespaces", &[], "namespaces", "")
            .await?;
        Ok(list.items.into_iter().map(|ns| ns.metadata.name).collect())
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodDescriptor>, ClusterError> {
        let list: ObjectList<Pod> = self
            .get_json(
                &format!("/api/v1/namespaces/{namespace}/pods"),
                &[],
                "namespaces",
                namespace,
            )
            .await?;
        Ok(list
            .items
            .into_iter()
            .map(|pod| {
                let mut descriptor = PodDescriptor::from(pod);
                if descriptor.namespace.is_empty() {
                    descriptor.namespace = namespace.to_string();
                }
                descriptor
            })
            .collect())
    }

    async fn pod_logs(
        &self,
        unit: &WorkloadUnit,
        request: &LogRequest,
    ) -> Result<String, ClusterError> {
        let mut query = vec![
            ("container", unit.container().to_string()),
            ("tailLines", request.tail_lines.to_string()),
        ];
        if let Some(since) = request.since {
            query.push(("sinceTime", since.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }

        let path = format!(
            "/api/v1/namespaces/{}/pods/{}/log",
            unit.namespace(),
            unit.pod()
        );
        let response = match self
            .send(self.request(&path).query(&query), "pods", unit.pod())
            .await
        {
            Ok(response) => response,
            Err(error) => return Err(self.explain_log_refusal(unit, error).await),
        };

        response
            .text()
            .await
            .map_err(|e| self.transport_error(&e))
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<PodDescriptor, ClusterError> {
        let mut descriptor = PodDescriptor::from(self.fetch_pod(namespace, name).await?);
        if descriptor.namespace.is_empty() {
            descriptor.namespace = namespace.to_string();
        }
        Ok(descriptor)
    }

    async fn list_events(
        &self,
        namespace: &str,
        involved_object: &str,
    ) -> Result<Vec<ClusterEvent>, ClusterError> {
        let list: ObjectList<Event> = self
            .get_json(
                &format!("/api/v1/namespaces/{namespace}/events"),
                &[(
                    "fieldSelector",
                    format!("involvedObject.name={involved_object}"),
                )],
                "events",
                involved_object,
            )
            .await?;
        Ok(list.items.into_iter().map(ClusterEvent::from).collect())
    }

    async fn get_node(&self, name: &str) -> Result<NodeDescriptor, ClusterError> {
        let node: Node = self
            .get_json(&format!("/api/v1/nodes/{name}"), &[], "nodes", name)
            .await?;
        Ok(NodeDescriptor::from(node))
    }
}
