//! Application manifest - the per-application desired-state document
//!
//! A manifest arrives as YAML from one of the manifest sources, is merged
//! with the built-in default manifest (see [`crate::defaults`]) and then
//! validated as a whole (see [`crate::validation`]). The types here model
//! the complete, post-defaulting document: every field is concrete except
//! the genuinely optional sections.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The desired-state document for one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationManifest {
    /// Owning team, used as a label on every synthesized object when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,

    /// Container image reference without a tag; the version comes from the
    /// deployment request so requested and deployed version cannot drift
    pub image: String,

    /// Port the application listens on
    pub port: u16,

    /// Liveness and readiness probes
    pub healthcheck: Healthcheck,

    /// Resource requests and limits
    pub resources: ResourceRequirements,

    /// Replica bounds and autoscale threshold
    pub replicas: Replicas,

    /// Disable ingress synthesis entirely
    pub ingress_disabled: bool,

    /// Metrics scraping
    pub metrics: Metrics,

    /// Inject the service-mesh sidecar
    pub mesh_enabled: bool,

    /// Run the leader-elector sidecar
    pub leader_election: bool,

    /// Deploy a cache cluster next to the application
    pub cache_cluster: bool,

    /// Run the secret-injection init step
    pub secret_injection: bool,

    /// External resources this application consumes
    #[serde(default)]
    pub used_resources: Vec<UsedResource>,

    /// Resources this application exposes to others
    #[serde(default)]
    pub exposed_resources: Vec<ExposedResource>,

    /// Alert rules distributed to the shared alert-rules config
    #[serde(default)]
    pub alerts: Vec<AlertRule>,
}

/// Liveness and readiness probe configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Healthcheck {
    pub liveness: Probe,
    pub readiness: Probe,
}

/// A single HTTP probe. An empty path disables the probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    pub path: String,
    pub initial_delay: u32,
    pub timeout: u32,
    pub period: u32,
    pub failure_threshold: u32,
}

/// CPU/memory pair used for both requests and limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLimits {
    pub cpu: String,
    pub memory: String,
}

/// Resource requests and limits for the workload container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    pub limits: ResourceLimits,
    pub requests: ResourceLimits,
}

/// Replica bounds with the CPU-utilization autoscale threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Replicas {
    pub min: u32,
    pub max: u32,
    pub cpu_threshold_percentage: u32,
}

/// Metrics scraping configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub enabled: bool,
    pub path: String,
}

/// Reference to an external resource the application consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsedResource {
    pub alias: String,

    #[serde(rename = "type")]
    pub kind: String,

    /// Optional property-name remap applied before the environment-variable
    /// naming transform
    #[serde(default)]
    pub property_map: BTreeMap<String, String>,
}

/// Resource the application exposes through the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposedResource {
    pub alias: String,

    #[serde(rename = "type")]
    pub kind: String,

    pub path: String,

    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// One alert rule, rendered into the shared alert-rules config on deploy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub alert: String,
    pub expr: String,

    #[serde(rename = "for")]
    pub for_duration: String,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl ApplicationManifest {
    /// The image reference with the deployed version appended.
    pub fn versioned_image(&self, version: &str) -> String {
        format!("{}:{}", self.image, version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::merge_with_defaults;

    #[test]
    fn test_manifest_parses_from_yaml() {
        let yaml = r#"
image: registry.example.com/orders
team: commerce
port: 9000
usedResources:
  - alias: ordersdb
    type: db
    propertyMap:
      url: jdbcUrl
exposedResources:
  - alias: orders-api
    type: rest
    path: /api/orders
alerts:
  - alert: OrdersDown
    expr: up == 0
    for: 5m
    annotations:
      action: Check the orders pods
"#;
        let value: serde_json::Value = serde_yaml::from_str(yaml).unwrap();
        let manifest = merge_with_defaults(value).unwrap();

        assert_eq!(manifest.image, "registry.example.com/orders");
        assert_eq!(manifest.team.as_deref(), Some("commerce"));
        assert_eq!(manifest.port, 9000);
        assert_eq!(manifest.used_resources.len(), 1);
        assert_eq!(manifest.used_resources[0].alias, "ordersdb");
        assert_eq!(manifest.used_resources[0].kind, "db");
        assert_eq!(
            manifest.used_resources[0].property_map.get("url"),
            Some(&"jdbcUrl".to_string())
        );
        assert_eq!(manifest.exposed_resources[0].path, "/api/orders");
        assert_eq!(manifest.alerts[0].for_duration, "5m");
    }

    #[test]
    fn test_versioned_image() {
        let yaml = "image: registry.example.com/orders";
        let value: serde_json::Value = serde_yaml::from_str(yaml).unwrap();
        let manifest = merge_with_defaults(value).unwrap();

        assert_eq!(
            manifest.versioned_image("1.4.2"),
            "registry.example.com/orders:1.4.2"
        );
    }
}
