//! Horizontal autoscaler synthesis
//!
//! Target bounds come straight from the manifest's replica section; the
//! add-on itself is gated by the synthesizer configuration.

use k8s_openapi::api::autoscaling::v2::{
    CrossVersionObjectReference, HorizontalPodAutoscaler, HorizontalPodAutoscalerSpec,
    MetricSpec, MetricTarget, ResourceMetricSource,
};

use stevedore_core::{ApplicationManifest, DeployRequest};

use super::meta::object_meta;

pub(crate) fn synthesize_autoscaler(
    request: &DeployRequest,
    manifest: &ApplicationManifest,
) -> HorizontalPodAutoscaler {
    HorizontalPodAutoscaler {
        metadata: object_meta(
            &request.application,
            &request.namespace,
            manifest.team.as_deref(),
        ),
        spec: Some(HorizontalPodAutoscalerSpec {
            scale_target_ref: CrossVersionObjectReference {
                api_version: Some("apps/v1".to_string()),
                kind: "Deployment".to_string(),
                name: request.application.clone(),
            },
            min_replicas: Some(manifest.replicas.min as i32),
            max_replicas: manifest.replicas.max as i32,
            metrics: Some(vec![MetricSpec {
                type_: "Resource".to_string(),
                resource: Some(ResourceMetricSource {
                    name: "cpu".to_string(),
                    target: MetricTarget {
                        type_: "Utilization".to_string(),
                        average_utilization: Some(
                            manifest.replicas.cpu_threshold_percentage as i32,
                        ),
                        ..Default::default()
                    },
                }),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        status: None,
    }
}
