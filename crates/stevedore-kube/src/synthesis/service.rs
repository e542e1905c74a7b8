//! Service synthesis

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use stevedore_core::{ApplicationManifest, DeployRequest};

use super::meta::object_meta;

pub(crate) fn synthesize_service(
    request: &DeployRequest,
    manifest: &ApplicationManifest,
) -> Service {
    let mut selector = BTreeMap::new();
    selector.insert("app".to_string(), request.application.clone());

    Service {
        metadata: object_meta(
            &request.application,
            &request.namespace,
            manifest.team.as_deref(),
        ),
        spec: Some(ServiceSpec {
            type_: Some("ClusterIP".to_string()),
            selector: Some(selector),
            ports: Some(vec![ServicePort {
                name: Some("http".to_string()),
                port: 80,
                target_port: Some(IntOrString::Int(manifest.port as i32)),
                protocol: Some("TCP".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        status: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stevedore_core::merge_with_defaults;

    #[test]
    fn test_service_targets_manifest_port() {
        let request = DeployRequest::new("orders", "1.4.2", "production");
        let manifest = merge_with_defaults(
            serde_json::json!({ "image": "example.com/orders", "port": 9000 }),
        )
        .unwrap();

        let service = synthesize_service(&request, &manifest);
        let spec = service.spec.as_ref().unwrap();

        assert_eq!(spec.type_.as_deref(), Some("ClusterIP"));
        assert_eq!(spec.selector.as_ref().unwrap().get("app").unwrap(), "orders");
        let port = &spec.ports.as_ref().unwrap()[0];
        assert_eq!(port.port, 80);
        assert_eq!(port.target_port, Some(IntOrString::Int(9000)));
    }
}
