//! Cache-cluster synthesis
//!
//! When the manifest asks for a cache cluster, the application gets a
//! companion workload and service named `<app>-cache`, labelled apart
//! from the application pods so the cache service selects only cache
//! pods.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, PodSpec, PodTemplateSpec, Service, ServicePort, ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use stevedore_core::{ApplicationManifest, DeployRequest};

use super::SynthesizerConfig;
use super::meta::named_meta;

const CACHE_PORT: i32 = 6379;

pub(crate) fn synthesize_cache(
    config: &SynthesizerConfig,
    request: &DeployRequest,
    manifest: &ApplicationManifest,
) -> (Deployment, Service) {
    let name = format!("{}-cache", request.application);

    let mut labels = BTreeMap::new();
    labels.insert("app".to_string(), name.clone());
    if let Some(team) = &manifest.team {
        labels.insert("team".to_string(), team.clone());
    }

    let workload = Deployment {
        metadata: named_meta(&name, &request.namespace, labels.clone()),
        spec: Some(DeploymentSpec {
            replicas: Some(1),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels.clone()),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: "cache".to_string(),
                        image: Some(config.cache_image.clone()),
                        ports: Some(vec![ContainerPort {
                            container_port: CACHE_PORT,
                            protocol: Some("TCP".to_string()),
                            ..Default::default()
                        }]),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        status: None,
    };

    let service = Service {
        metadata: named_meta(&name, &request.namespace, labels.clone()),
        spec: Some(ServiceSpec {
            type_: Some("ClusterIP".to_string()),
            selector: Some(labels),
            ports: Some(vec![ServicePort {
                name: Some("cache".to_string()),
                port: CACHE_PORT,
                target_port: Some(IntOrString::Int(CACHE_PORT)),
                protocol: Some("TCP".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        status: None,
    };

    (workload, service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stevedore_core::merge_with_defaults;

    #[test]
    fn test_cache_pair_named_and_selected_apart() {
        let request = DeployRequest::new("orders", "1.4.2", "production");
        let manifest = merge_with_defaults(serde_json::json!({
            "image": "example.com/orders",
            "cacheCluster": true
        }))
        .unwrap();

        let (workload, service) =
            synthesize_cache(&SynthesizerConfig::default(), &request, &manifest);

        assert_eq!(workload.metadata.name.as_deref(), Some("orders-cache"));
        assert_eq!(service.metadata.name.as_deref(), Some("orders-cache"));
        // The cache service must not select application pods
        assert_eq!(
            service
                .spec
                .as_ref()
                .unwrap()
                .selector
                .as_ref()
                .unwrap()
                .get("app")
                .unwrap(),
            "orders-cache"
        );
    }
}
