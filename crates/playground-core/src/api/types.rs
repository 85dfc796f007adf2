//! Wire types exchanged with the playground backend.
//!
//! Field names follow the backend's camelCase JSON. Collections keyed by
//! identifier use `BTreeMap` so tables render in a stable order.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Pod lifecycle phase as reported by the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Pending,
    Running,
    Succeeded,
    Failed,
    #[serde(other)]
    Unknown,
}

impl Phase {
    /// Phases in which the instance may still become reachable.
    pub fn is_active(&self) -> bool {
        matches!(self, Phase::Running | Phase::Pending)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Pending => "Pending",
            Phase::Running => "Running",
            Phase::Succeeded => "Succeeded",
            Phase::Failed => "Failed",
            Phase::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameValuePair {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    #[serde(default)]
    pub path: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<NameValuePair>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<Port>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeConfiguration>,
}

impl Template {
    /// Templates are offered for session creation only when tagged `public = "true"`.
    pub fn is_public(&self) -> bool {
        self.tags
            .as_ref()
            .and_then(|tags| tags.get("public"))
            .is_some_and(|v| v == "true")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pod {
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Seconds since the pod started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub template: Template,
    #[serde(default)]
    pub url: String,
    pub pod: Pod,
    /// Allotted lifetime in minutes.
    pub duration: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub admin: bool,
    pub can_customize_duration: bool,
}

/// Payload for creating a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfiguration {
    pub admin: bool,
    pub can_customize_duration: bool,
}

/// Payload for updating a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateConfiguration {
    pub admin: bool,
    pub can_customize_duration: bool,
}

impl From<UserConfiguration> for User {
    fn from(conf: UserConfiguration) -> Self {
        Self {
            admin: conf.admin,
            can_customize_duration: conf.can_customize_duration,
        }
    }
}

impl From<UserUpdateConfiguration> for User {
    fn from(conf: UserUpdateConfiguration) -> Self {
        Self {
            admin: conf.admin,
            can_customize_duration: conf.can_customize_duration,
        }
    }
}

/// The logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaygroundUser {
    pub id: String,
    pub admin: bool,
    #[serde(default)]
    pub can_customize_duration: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDefaults {
    /// Default session lifetime in minutes.
    pub duration: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub session_defaults: SessionDefaults,
}

/// Response of the root endpoint: configuration, templates and the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playground {
    pub configuration: Configuration,
    #[serde(default)]
    pub templates: BTreeMap<String, Template>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<PlaygroundUser>,
}

/// Body of a session creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfiguration {
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStateWaiting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting: Option<ContainerStateWaiting>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ContainerState>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_statuses: Option<Vec<ContainerStatus>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PodStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstancePod {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<PodDetails>,
}

/// The IDE runtime backing a session, as seen through its pod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod: Option<InstancePod>,
}

impl Instance {
    fn status(&self) -> Option<&PodStatus> {
        self.pod.as_ref()?.details.as_ref()?.status.as_ref()
    }

    pub fn phase(&self) -> Option<Phase> {
        self.status()?.phase
    }

    /// Waiting state of the first container, if it is waiting.
    pub fn first_waiting(&self) -> Option<&ContainerStateWaiting> {
        self.status()?
            .container_statuses
            .as_ref()?
            .first()?
            .state
            .as_ref()?
            .waiting
            .as_ref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<PlaygroundUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<Instance>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_phase_deserializes_to_unknown() {
        let phase: Phase = serde_json::from_str("\"Evicted\"").unwrap();
        assert_eq!(phase, Phase::Unknown);
        assert!(!phase.is_active());
    }

    #[test]
    fn test_template_is_public_only_with_true_tag() {
        let mut template = Template {
            name: "node".to_string(),
            image: "paritytech/node:latest".to_string(),
            description: String::new(),
            tags: None,
            runtime: None,
        };
        assert!(!template.is_public());

        template.tags = Some(BTreeMap::from([("public".to_string(), "false".to_string())]));
        assert!(!template.is_public());

        template.tags = Some(BTreeMap::from([("public".to_string(), "true".to_string())]));
        assert!(template.is_public());
    }

    #[test]
    fn test_instance_details_reads_nested_pod_status() {
        let details: InstanceDetails = serde_json::from_value(serde_json::json!({
            "instance": {
                "url": "https://abc.playground.local",
                "pod": {
                    "details": {
                        "status": {
                            "phase": "Pending",
                            "containerStatuses": [
                                { "state": { "waiting": {
                                    "reason": "ImagePullBackOff",
                                    "message": "Back-off pulling image"
                                } } }
                            ]
                        }
                    }
                }
            }
        }))
        .unwrap();

        let instance = details.instance.unwrap();
        assert_eq!(instance.phase(), Some(Phase::Pending));
        let waiting = instance.first_waiting().unwrap();
        assert_eq!(waiting.reason.as_deref(), Some("ImagePullBackOff"));
        assert_eq!(waiting.message.as_deref(), Some("Back-off pulling image"));
    }

    #[test]
    fn test_instance_without_pod_has_no_phase() {
        let instance = Instance {
            url: "https://x".to_string(),
            pod: None,
        };
        assert_eq!(instance.phase(), None);
        assert!(instance.first_waiting().is_none());
    }

    #[test]
    fn test_user_wire_format_is_camel_case() {
        let json = serde_json::to_value(UserConfiguration {
            admin: false,
            can_customize_duration: true,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "admin": false, "canCustomizeDuration": true })
        );
    }
}
