//! Workload (Deployment) synthesis

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec, DeploymentStrategy, RollingUpdateDeployment};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EmptyDirVolumeSource, EnvVar, HTTPGetAction, PodSpec,
    PodTemplateSpec, Probe, ResourceRequirements, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use stevedore_core::{ApplicationManifest, DeployRequest, ResourceLimits};

use super::meta::{labels, object_meta};
use super::{SecretInjectionConfig, SynthesizerConfig};

/// Shared volume between the secret-injection init step and the app.
const INJECTED_SECRETS_VOLUME: &str = "injected-secrets";
const INJECTED_SECRETS_PATH: &str = "/var/run/secrets/injected";

/// Port the leader-elector sidecar answers on.
const ELECTOR_PORT: i32 = 4040;

pub(crate) fn synthesize_workload(
    config: &SynthesizerConfig,
    request: &DeployRequest,
    manifest: &ApplicationManifest,
    env: Vec<EnvVar>,
) -> Deployment {
    let app_labels = labels(&request.application, manifest.team.as_deref());

    let secret_injection = config
        .secret_injection
        .as_ref()
        .filter(|_| manifest.secret_injection);

    let mut containers = vec![app_container(request, manifest, env, secret_injection.is_some())];
    if manifest.leader_election {
        containers.push(elector_container(config));
    }

    let init_containers = secret_injection.map(|injection| vec![injector_container(injection)]);
    let volumes = secret_injection.map(|_| {
        vec![Volume {
            name: INJECTED_SECRETS_VOLUME.to_string(),
            empty_dir: Some(EmptyDirVolumeSource::default()),
            ..Default::default()
        }]
    });

    Deployment {
        metadata: object_meta(
            &request.application,
            &request.namespace,
            manifest.team.as_deref(),
        ),
        spec: Some(DeploymentSpec {
            replicas: Some(manifest.replicas.min as i32),
            selector: LabelSelector {
                match_labels: Some(selector_labels(&request.application)),
                ..Default::default()
            },
            strategy: Some(DeploymentStrategy {
                type_: Some("RollingUpdate".to_string()),
                rolling_update: Some(RollingUpdateDeployment {
                    max_surge: Some(IntOrString::Int(1)),
                    max_unavailable: Some(IntOrString::Int(0)),
                }),
            }),
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(app_labels),
                    annotations: pod_annotations(manifest),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    service_account_name: Some(request.application.clone()),
                    containers,
                    init_containers,
                    volumes,
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        status: None,
    }
}

fn selector_labels(application: &str) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert("app".to_string(), application.to_string());
    labels
}

fn app_container(
    request: &DeployRequest,
    manifest: &ApplicationManifest,
    env: Vec<EnvVar>,
    mount_injected_secrets: bool,
) -> Container {
    Container {
        name: request.application.clone(),
        image: Some(manifest.versioned_image(&request.version)),
        ports: Some(vec![ContainerPort {
            container_port: manifest.port as i32,
            name: Some("http".to_string()),
            protocol: Some("TCP".to_string()),
            ..Default::default()
        }]),
        env: Some(env),
        liveness_probe: probe(&manifest.healthcheck.liveness, manifest.port),
        readiness_probe: probe(&manifest.healthcheck.readiness, manifest.port),
        resources: Some(ResourceRequirements {
            limits: Some(quantities(&manifest.resources.limits)),
            requests: Some(quantities(&manifest.resources.requests)),
            ..Default::default()
        }),
        volume_mounts: mount_injected_secrets.then(|| {
            vec![VolumeMount {
                name: INJECTED_SECRETS_VOLUME.to_string(),
                mount_path: INJECTED_SECRETS_PATH.to_string(),
                read_only: Some(true),
                ..Default::default()
            }]
        }),
        ..Default::default()
    }
}

fn elector_container(config: &SynthesizerConfig) -> Container {
    Container {
        name: "elector".to_string(),
        image: Some(config.elector_image.clone()),
        ports: Some(vec![ContainerPort {
            container_port: ELECTOR_PORT,
            protocol: Some("TCP".to_string()),
            ..Default::default()
        }]),
        env: Some(vec![EnvVar {
            name: "ELECTOR_PORT".to_string(),
            value: Some(ELECTOR_PORT.to_string()),
            value_from: None,
        }]),
        ..Default::default()
    }
}

fn injector_container(injection: &SecretInjectionConfig) -> Container {
    Container {
        name: "secret-injector".to_string(),
        image: Some(injection.image.clone()),
        env: Some(vec![EnvVar {
            name: "SECRET_INJECTOR_ADDR".to_string(),
            value: Some(injection.address.clone()),
            value_from: None,
        }]),
        volume_mounts: Some(vec![VolumeMount {
            name: INJECTED_SECRETS_VOLUME.to_string(),
            mount_path: INJECTED_SECRETS_PATH.to_string(),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

/// No probe object when the path is empty.
fn probe(spec: &stevedore_core::Probe, port: u16) -> Option<Probe> {
    if spec.path.is_empty() {
        return None;
    }
    Some(Probe {
        http_get: Some(HTTPGetAction {
            path: Some(spec.path.clone()),
            port: IntOrString::Int(port as i32),
            ..Default::default()
        }),
        initial_delay_seconds: Some(spec.initial_delay as i32),
        timeout_seconds: Some(spec.timeout as i32),
        period_seconds: Some(spec.period as i32),
        failure_threshold: Some(spec.failure_threshold as i32),
        ..Default::default()
    })
}

fn quantities(limits: &ResourceLimits) -> BTreeMap<String, Quantity> {
    let mut map = BTreeMap::new();
    map.insert("cpu".to_string(), Quantity(limits.cpu.clone()));
    map.insert("memory".to_string(), Quantity(limits.memory.clone()));
    map
}

fn pod_annotations(manifest: &ApplicationManifest) -> Option<BTreeMap<String, String>> {
    let mut annotations = BTreeMap::new();

    if manifest.metrics.enabled {
        annotations.insert("prometheus.io/scrape".to_string(), "true".to_string());
        annotations.insert(
            "prometheus.io/path".to_string(),
            manifest.metrics.path.clone(),
        );
        annotations.insert("prometheus.io/port".to_string(), manifest.port.to_string());
    }
    if manifest.mesh_enabled {
        annotations.insert("sidecar.istio.io/inject".to_string(), "true".to_string());
    }

    (!annotations.is_empty()).then_some(annotations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stevedore_core::merge_with_defaults;

    fn workload_for(manifest_json: serde_json::Value) -> Deployment {
        let request = DeployRequest::new("orders", "1.4.2", "production");
        let manifest = merge_with_defaults(manifest_json).unwrap();
        synthesize_workload(
            &SynthesizerConfig::default(),
            &request,
            &manifest,
            vec![],
        )
    }

    fn pod_spec(workload: &Deployment) -> &PodSpec {
        workload
            .spec
            .as_ref()
            .unwrap()
            .template
            .spec
            .as_ref()
            .unwrap()
    }

    #[test]
    fn test_image_carries_requested_version() {
        let workload = workload_for(serde_json::json!({ "image": "example.com/orders" }));
        let container = &pod_spec(&workload).containers[0];
        assert_eq!(container.image.as_deref(), Some("example.com/orders:1.4.2"));
    }

    #[test]
    fn test_replicas_start_at_min() {
        let workload = workload_for(serde_json::json!({
            "image": "example.com/orders",
            "replicas": { "min": 3, "max": 6 }
        }));
        assert_eq!(workload.spec.as_ref().unwrap().replicas, Some(3));
    }

    #[test]
    fn test_probes_from_manifest() {
        let workload = workload_for(serde_json::json!({ "image": "example.com/orders" }));
        let container = &pod_spec(&workload).containers[0];

        let liveness = container.liveness_probe.as_ref().unwrap();
        assert_eq!(
            liveness.http_get.as_ref().unwrap().path.as_deref(),
            Some("/isalive")
        );
        assert_eq!(liveness.initial_delay_seconds, Some(20));
    }

    #[test]
    fn test_empty_probe_path_means_no_probe() {
        let workload = workload_for(serde_json::json!({
            "image": "example.com/orders",
            "healthcheck": { "liveness": { "path": "" } }
        }));
        let container = &pod_spec(&workload).containers[0];
        assert!(container.liveness_probe.is_none());
        assert!(container.readiness_probe.is_some());
    }

    #[test]
    fn test_no_sidecars_by_default() {
        let workload = workload_for(serde_json::json!({ "image": "example.com/orders" }));
        let spec = pod_spec(&workload);
        assert_eq!(spec.containers.len(), 1);
        // Absent entirely, not present with empty values
        assert!(spec.init_containers.is_none());
        assert!(spec.volumes.is_none());
        assert!(workload.spec.as_ref().unwrap().template.metadata.as_ref().unwrap().annotations.is_none());
    }

    #[test]
    fn test_leader_election_adds_elector_sidecar() {
        let workload = workload_for(serde_json::json!({
            "image": "example.com/orders",
            "leaderElection": true
        }));
        let spec = pod_spec(&workload);
        assert_eq!(spec.containers.len(), 2);
        assert_eq!(spec.containers[1].name, "elector");
    }

    #[test]
    fn test_secret_injection_adds_init_container_and_volume() {
        let request = DeployRequest::new("orders", "1.4.2", "production");
        let manifest = merge_with_defaults(serde_json::json!({
            "image": "example.com/orders",
            "secretInjection": true
        }))
        .unwrap();
        let config = SynthesizerConfig {
            secret_injection: Some(SecretInjectionConfig {
                image: "example.com/injector".to_string(),
                address: "https://secrets.example.com".to_string(),
            }),
            ..Default::default()
        };

        let workload = synthesize_workload(&config, &request, &manifest, vec![]);
        let spec = pod_spec(&workload);

        let init = spec.init_containers.as_ref().unwrap();
        assert_eq!(init[0].name, "secret-injector");
        assert_eq!(spec.volumes.as_ref().unwrap()[0].name, "injected-secrets");
        assert!(spec.containers[0].volume_mounts.is_some());
    }

    #[test]
    fn test_secret_injection_off_when_not_configured() {
        // Manifest toggle on, but the synthesizer has no injector config
        let workload = workload_for(serde_json::json!({
            "image": "example.com/orders",
            "secretInjection": true
        }));
        assert!(pod_spec(&workload).init_containers.is_none());
    }

    #[test]
    fn test_metrics_annotations() {
        let workload = workload_for(serde_json::json!({
            "image": "example.com/orders",
            "metrics": { "enabled": true, "path": "/internal/metrics" }
        }));
        let annotations = workload
            .spec
            .as_ref()
            .unwrap()
            .template
            .metadata
            .as_ref()
            .unwrap()
            .annotations
            .as_ref()
            .unwrap();

        assert_eq!(annotations.get("prometheus.io/scrape").unwrap(), "true");
        assert_eq!(
            annotations.get("prometheus.io/path").unwrap(),
            "/internal/metrics"
        );
    }
}
