//! Service account and role binding synthesis
//!
//! Every application runs under its own service account. The role binding
//! exists only for leader election: it grants the elector sidecar the
//! endpoint access it needs, and is absent otherwise.

use k8s_openapi::api::core::v1::ServiceAccount;
use k8s_openapi::api::rbac::v1::{RoleBinding, RoleRef, Subject};

use stevedore_core::{ApplicationManifest, DeployRequest};

use super::meta::object_meta;

pub(crate) fn synthesize_service_account(
    request: &DeployRequest,
    manifest: &ApplicationManifest,
) -> ServiceAccount {
    ServiceAccount {
        metadata: object_meta(
            &request.application,
            &request.namespace,
            manifest.team.as_deref(),
        ),
        ..Default::default()
    }
}

pub(crate) fn synthesize_role_binding(
    request: &DeployRequest,
    manifest: &ApplicationManifest,
) -> RoleBinding {
    RoleBinding {
        metadata: object_meta(
            &request.application,
            &request.namespace,
            manifest.team.as_deref(),
        ),
        role_ref: RoleRef {
            api_group: "rbac.authorization.k8s.io".to_string(),
            kind: "ClusterRole".to_string(),
            name: "elector".to_string(),
        },
        subjects: Some(vec![Subject {
            kind: "ServiceAccount".to_string(),
            name: request.application.clone(),
            namespace: Some(request.namespace.clone()),
            ..Default::default()
        }]),
    }
}
