//! Application secret synthesis
//!
//! One Secret per application, holding every resolved secret value under
//! its transformed environment-variable name plus the certificate blobs
//! verbatim. Synthesized even when empty so the object set has a stable
//! shape across deployments.

use std::collections::BTreeMap;

use k8s_openapi::ByteString;
use k8s_openapi::api::core::v1::Secret;

use stevedore_core::{ApplicationManifest, DeployRequest};
use stevedore_registry::ResolvedResource;

use super::env::env_var_name;
use super::meta::object_meta;

pub(crate) fn synthesize_secret(
    request: &DeployRequest,
    manifest: &ApplicationManifest,
    resources: &[ResolvedResource],
) -> Secret {
    let mut string_data = BTreeMap::new();
    let mut data = BTreeMap::new();

    for resource in resources {
        for (key, value) in &resource.secrets {
            string_data.insert(env_var_name(&resource.name, key), value.clone());
        }
        for (key, content) in &resource.certificates {
            data.insert(key.clone(), ByteString(content.clone()));
        }
    }

    Secret {
        metadata: object_meta(
            &request.application,
            &request.namespace,
            manifest.team.as_deref(),
        ),
        string_data: (!string_data.is_empty()).then_some(string_data),
        data: (!data.is_empty()).then_some(data),
        type_: Some("Opaque".to_string()),
        ..Default::default()
    }
}
