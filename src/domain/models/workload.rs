//! Workload unit identity and startup-condition vocabulary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// One container of one pod in one namespace.
///
/// This triple is the correlation key for every capability call made during
/// a diagnostic pass. All three components are required.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkloadUnit {
    namespace: String,
    pod: String,
    container: String,
}

impl WorkloadUnit {
    /// Build a unit, rejecting empty components.
    pub fn new(
        namespace: impl Into<String>,
        pod: impl Into<String>,
        container: impl Into<String>,
    ) -> DomainResult<Self> {
        let unit = Self {
            namespace: namespace.into().trim().to_string(),
            pod: pod.into().trim().to_string(),
            container: container.into().trim().to_string(),
        };
        for (field, value) in [
            ("namespace", &unit.namespace),
            ("pod", &unit.pod),
            ("container", &unit.container),
        ] {
            if value.is_empty() {
                return Err(DomainError::InvalidWorkloadUnit(format!(
                    "{field} must not be empty"
                )));
            }
        }
        Ok(unit)
    }

    /// Namespace of the pod.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Pod name.
    pub fn pod(&self) -> &str {
        &self.pod
    }

    /// Container name.
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Stable map key: `namespace/pod/container`.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WorkloadUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.pod, self.container)
    }
}

/// Parses the pipe-delimited form `namespace|pod|container`.
impl FromStr for WorkloadUnit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('|').collect();
        match parts.as_slice() {
            [namespace, pod, container] => Self::new(*namespace, *pod, *container),
            _ => Err(DomainError::InvalidWorkloadUnit(
                "input format: namespace|pod_name|container_name".to_string(),
            )),
        }
    }
}

/// A container state that prevents log streaming but is itself diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupCondition {
    /// Image could not be pulled.
    ImagePull,
    /// Container keeps crashing on start.
    CrashLoop,
    /// Container was OOM killed.
    OutOfMemory,
    /// Pod was evicted from its node.
    Evicted,
    /// A liveness, readiness or startup probe failed.
    ProbeFailure,
    /// A volume could not be mounted.
    VolumeMount,
    /// A referenced secret is missing.
    MissingSecret,
    /// A referenced config map is missing.
    MissingConfigMap,
    /// Container is still waiting to start.
    WaitingToStart,
    /// Pod is not yet scheduled or started.
    Pending,
}

/// Keyword table, most specific first. `waiting to start` also prefixes image
/// pull and crash-loop messages, so it is checked late.
const STARTUP_KEYWORDS: &[(&str, StartupCondition)] = &[
    ("pull image", StartupCondition::ImagePull),
    ("imagepullbackoff", StartupCondition::ImagePull),
    ("errimagepull", StartupCondition::ImagePull),
    ("crashloopbackoff", StartupCondition::CrashLoop),
    ("oomkilled", StartupCondition::OutOfMemory),
    ("evicted", StartupCondition::Evicted),
    ("probe failed", StartupCondition::ProbeFailure),
    ("mount", StartupCondition::VolumeMount),
    ("volume", StartupCondition::VolumeMount),
    ("secret", StartupCondition::MissingSecret),
    ("configmap", StartupCondition::MissingConfigMap),
    ("waiting to start", StartupCondition::WaitingToStart),
    ("pending", StartupCondition::Pending),
];

impl StartupCondition {
    /// Classify a collaborator message by keyword, case-insensitively.
    pub fn classify(message: &str) -> Option<Self> {
        let lowered = message.to_lowercase();
        STARTUP_KEYWORDS
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword))
            .map(|(_, condition)| *condition)
    }

    /// Map a container `state.waiting.reason` onto a condition.
    pub fn from_waiting_reason(reason: &str) -> Option<Self> {
        match reason {
            "ImagePullBackOff" | "ErrImagePull" | "InvalidImageName" | "ErrImageNeverPull" => {
                Some(Self::ImagePull)
            }
            "CrashLoopBackOff" => Some(Self::CrashLoop),
            "OOMKilled" => Some(Self::OutOfMemory),
            "Evicted" => Some(Self::Evicted),
            "ContainerCreating" | "PodInitializing" => Some(Self::WaitingToStart),
            _ => None,
        }
    }

    /// Snake-case name used in logs and JSON.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ImagePull => "image_pull",
            Self::CrashLoop => "crash_loop",
            Self::OutOfMemory => "out_of_memory",
            Self::Evicted => "evicted",
            Self::ProbeFailure => "probe_failure",
            Self::VolumeMount => "volume_mount",
            Self::MissingSecret => "missing_secret",
            Self::MissingConfigMap => "missing_config_map",
            Self::WaitingToStart => "waiting_to_start",
            Self::Pending => "pending",
        }
    }
}

impl fmt::Display for StartupCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
