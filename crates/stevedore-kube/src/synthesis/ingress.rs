//! Ingress synthesis
//!
//! Host rules come from two sources: every exposed resource maps onto the
//! application's host under the platform ingress domain, and the
//! best-effort load-balancer lookup contributes host -> context-root
//! pairs. No ingress object is produced when ingress is disabled or no
//! rules exist; absence is the "off" representation.

use std::collections::BTreeMap;

use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, ServiceBackendPort,
};

use stevedore_core::{ApplicationManifest, DeployRequest};
use stevedore_registry::{KIND_LOAD_BALANCER_CONFIG, ResolvedResource};

use super::SynthesizerConfig;
use super::meta::object_meta;

pub(crate) fn synthesize_ingress(
    config: &SynthesizerConfig,
    request: &DeployRequest,
    manifest: &ApplicationManifest,
    resources: &[ResolvedResource],
) -> Option<Ingress> {
    if manifest.ingress_disabled {
        return None;
    }

    // host -> paths, ordered for deterministic output
    let mut rules: BTreeMap<String, Vec<String>> = BTreeMap::new();

    let app_host = format!("{}.{}", request.application, config.ingress_domain);
    for exposed in &manifest.exposed_resources {
        rules.entry(app_host.clone()).or_default().push(exposed.path.clone());
    }

    for resource in resources {
        if resource.kind != KIND_LOAD_BALANCER_CONFIG {
            continue;
        }
        for (host, context_root) in &resource.ingresses {
            rules
                .entry(host.clone())
                .or_default()
                .push(context_root.clone());
        }
    }

    if rules.is_empty() {
        return None;
    }

    let backend = IngressBackend {
        service: Some(IngressServiceBackend {
            name: request.application.clone(),
            port: Some(ServiceBackendPort {
                number: Some(80),
                ..Default::default()
            }),
        }),
        ..Default::default()
    };

    let rules = rules
        .into_iter()
        .map(|(host, paths)| IngressRule {
            host: Some(host),
            http: Some(HTTPIngressRuleValue {
                paths: paths
                    .into_iter()
                    .map(|path| HTTPIngressPath {
                        path: Some(path),
                        path_type: "Prefix".to_string(),
                        backend: backend.clone(),
                    })
                    .collect(),
            }),
        })
        .collect();

    Some(Ingress {
        metadata: object_meta(
            &request.application,
            &request.namespace,
            manifest.team.as_deref(),
        ),
        spec: Some(IngressSpec {
            rules: Some(rules),
            ..Default::default()
        }),
        status: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stevedore_core::merge_with_defaults;

    fn request() -> DeployRequest {
        DeployRequest::new("orders", "1.4.2", "production")
    }

    #[test]
    fn test_no_rules_means_no_ingress() {
        let manifest =
            merge_with_defaults(serde_json::json!({ "image": "example.com/orders" })).unwrap();
        let ingress = synthesize_ingress(
            &SynthesizerConfig::default(),
            &request(),
            &manifest,
            &[],
        );
        assert!(ingress.is_none());
    }

    #[test]
    fn test_exposed_resources_build_app_host_rules() {
        let manifest = merge_with_defaults(serde_json::json!({
            "image": "example.com/orders",
            "exposedResources": [
                { "alias": "orders-api", "type": "rest", "path": "/api/orders" }
            ]
        }))
        .unwrap();
        let config = SynthesizerConfig {
            ingress_domain: "apps.example.com".to_string(),
            ..Default::default()
        };

        let ingress = synthesize_ingress(&config, &request(), &manifest, &[]).unwrap();
        let rules = ingress.spec.as_ref().unwrap().rules.as_ref().unwrap();

        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].host.as_deref(), Some("orders.apps.example.com"));
        let paths = &rules[0].http.as_ref().unwrap().paths;
        assert_eq!(paths[0].path.as_deref(), Some("/api/orders"));
        assert_eq!(
            paths[0].backend.service.as_ref().unwrap().name,
            "orders"
        );
    }

    #[test]
    fn test_load_balancer_map_contributes_rules() {
        let manifest =
            merge_with_defaults(serde_json::json!({ "image": "example.com/orders" })).unwrap();
        let mut lb = ResolvedResource::new(KIND_LOAD_BALANCER_CONFIG, KIND_LOAD_BALANCER_CONFIG);
        lb.ingresses
            .insert("legacy.example.com".to_string(), "/orders".to_string());

        let ingress = synthesize_ingress(
            &SynthesizerConfig::default(),
            &request(),
            &manifest,
            &[lb],
        )
        .unwrap();
        let rules = ingress.spec.as_ref().unwrap().rules.as_ref().unwrap();

        assert_eq!(rules[0].host.as_deref(), Some("legacy.example.com"));
    }

    #[test]
    fn test_ingress_disabled_wins() {
        let manifest = merge_with_defaults(serde_json::json!({
            "image": "example.com/orders",
            "ingressDisabled": true,
            "exposedResources": [
                { "alias": "orders-api", "type": "rest", "path": "/api/orders" }
            ]
        }))
        .unwrap();

        let ingress = synthesize_ingress(
            &SynthesizerConfig::default(),
            &request(),
            &manifest,
            &[],
        );
        assert!(ingress.is_none());
    }
}
