//! Object synthesis
//!
//! Turns {deployment request, manifest, resolved resources} into the full
//! set of target-object definitions. Synthesis is a pure function: given
//! identical inputs it produces an identical object set, which is what
//! makes re-application idempotent and the whole thing testable without a
//! cluster.
//!
//! Optional sections are `None` when their toggle is off; absence is the
//! "off" representation, never an empty object.

mod alerts;
mod autoscaler;
mod cache;
mod env;
mod ingress;
mod meta;
mod rbac;
mod secret;
mod service;
mod workload;

pub use env::env_var_name;

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{Secret, Service, ServiceAccount};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::api::rbac::v1::RoleBinding;

use stevedore_core::{ApplicationManifest, DeployRequest};
use stevedore_registry::ResolvedResource;

/// Secret-injection sidecar wiring. Absent means the add-on is globally
/// off regardless of per-application manifest toggles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretInjectionConfig {
    pub image: String,
    pub address: String,
}

/// Platform-level synthesis configuration, threaded in at construction
/// rather than read from ambient process state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizerConfig {
    /// Cluster-internal DNS domain
    pub cluster_domain: String,

    /// Domain applications are exposed under
    pub ingress_domain: String,

    /// Synthesize horizontal autoscalers (optional add-on, off by default)
    pub autoscaling: bool,

    /// Leader-elector sidecar image
    pub elector_image: String,

    /// Cache-cluster image
    pub cache_image: String,

    /// Name of the shared alert-rules config
    pub alerts_config_map: String,

    /// Secret-injection sidecar wiring; None disables the add-on globally
    pub secret_injection: Option<SecretInjectionConfig>,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            cluster_domain: "cluster.local".to_string(),
            ingress_domain: "apps.internal".to_string(),
            autoscaling: false,
            elector_image: "platform/elector:latest".to_string(),
            cache_image: "redis:7-alpine".to_string(),
            alerts_config_map: "alert-rules".to_string(),
            secret_injection: None,
        }
    }
}

/// One application's entry in the shared alert-rules config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEntry {
    pub key: String,
    pub value: String,
}

/// The full set of target-object definitions for one deployment.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetObjectSet {
    pub service: Service,
    pub workload: Deployment,
    pub secret: Secret,
    pub service_account: ServiceAccount,
    pub role_binding: Option<RoleBinding>,
    pub autoscaler: Option<HorizontalPodAutoscaler>,
    pub ingress: Option<Ingress>,
    pub cache_workload: Option<Deployment>,
    pub cache_service: Option<Service>,
    pub alert_entry: Option<AlertEntry>,
}

/// Synthesizes target objects from validated inputs.
pub struct Synthesizer {
    config: SynthesizerConfig,
}

impl Synthesizer {
    pub fn new(config: SynthesizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    /// Synthesize the full object set. Pure and deterministic.
    pub fn synthesize(
        &self,
        request: &DeployRequest,
        manifest: &ApplicationManifest,
        resources: &[ResolvedResource],
    ) -> TargetObjectSet {
        let env = env::environment(request, manifest, resources);

        let (cache_workload, cache_service) = if manifest.cache_cluster {
            let (workload, service) = cache::synthesize_cache(&self.config, request, manifest);
            (Some(workload), Some(service))
        } else {
            (None, None)
        };

        TargetObjectSet {
            service: service::synthesize_service(request, manifest),
            workload: workload::synthesize_workload(&self.config, request, manifest, env),
            secret: secret::synthesize_secret(request, manifest, resources),
            service_account: rbac::synthesize_service_account(request, manifest),
            role_binding: manifest
                .leader_election
                .then(|| rbac::synthesize_role_binding(request, manifest)),
            autoscaler: self
                .config
                .autoscaling
                .then(|| autoscaler::synthesize_autoscaler(request, manifest)),
            ingress: ingress::synthesize_ingress(&self.config, request, manifest, resources),
            cache_workload,
            cache_service,
            alert_entry: alerts::synthesize_alert_entry(request, manifest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stevedore_core::merge_with_defaults;

    fn request() -> DeployRequest {
        DeployRequest::new("app", "version", "ns").skip_resource_binding()
    }

    fn manifest(json: serde_json::Value) -> ApplicationManifest {
        merge_with_defaults(json).unwrap()
    }

    #[test]
    fn test_minimal_manifest_synthesizes_core_four() {
        let set = Synthesizer::new(SynthesizerConfig::default()).synthesize(
            &request(),
            &manifest(serde_json::json!({
                "image": "registry.example.com/app",
                "replicas": { "min": 2, "max": 4, "cpuThresholdPercentage": 50 }
            })),
            &[],
        );

        for (name, namespace) in [
            (&set.service.metadata.name, &set.service.metadata.namespace),
            (&set.workload.metadata.name, &set.workload.metadata.namespace),
            (&set.secret.metadata.name, &set.secret.metadata.namespace),
            (
                &set.service_account.metadata.name,
                &set.service_account.metadata.namespace,
            ),
        ] {
            assert_eq!(name.as_deref(), Some("app"));
            assert_eq!(namespace.as_deref(), Some("ns"));
        }

        assert!(set.role_binding.is_none());
        assert!(set.autoscaler.is_none());
        assert!(set.ingress.is_none());
        assert!(set.cache_workload.is_none());
        assert!(set.cache_service.is_none());
        assert!(set.alert_entry.is_none());
    }

    #[test]
    fn test_synthesis_is_pure() {
        let synthesizer = Synthesizer::new(SynthesizerConfig::default());
        let manifest = manifest(serde_json::json!({
            "image": "registry.example.com/app",
            "leaderElection": true,
            "cacheCluster": true,
            "exposedResources": [
                { "alias": "api", "type": "rest", "path": "/api" }
            ]
        }));

        let first = synthesizer.synthesize(&request(), &manifest, &[]);
        let second = synthesizer.synthesize(&request(), &manifest, &[]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_leader_election_gates_role_binding() {
        let synthesizer = Synthesizer::new(SynthesizerConfig::default());
        let set = synthesizer.synthesize(
            &request(),
            &manifest(serde_json::json!({
                "image": "registry.example.com/app",
                "leaderElection": true
            })),
            &[],
        );
        assert!(set.role_binding.is_some());
    }

    #[test]
    fn test_autoscaling_add_on_gates_autoscaler() {
        let manifest = manifest(serde_json::json!({ "image": "registry.example.com/app" }));

        let without = Synthesizer::new(SynthesizerConfig::default())
            .synthesize(&request(), &manifest, &[]);
        assert!(without.autoscaler.is_none());

        let config = SynthesizerConfig {
            autoscaling: true,
            ..Default::default()
        };
        let with = Synthesizer::new(config).synthesize(&request(), &manifest, &[]);
        let autoscaler = with.autoscaler.unwrap();
        assert_eq!(autoscaler.spec.as_ref().unwrap().max_replicas, 4);
    }

    #[test]
    fn test_cache_cluster_synthesizes_pair() {
        let set = Synthesizer::new(SynthesizerConfig::default()).synthesize(
            &request(),
            &manifest(serde_json::json!({
                "image": "registry.example.com/app",
                "cacheCluster": true
            })),
            &[],
        );
        assert!(set.cache_workload.is_some());
        assert!(set.cache_service.is_some());
    }
}
