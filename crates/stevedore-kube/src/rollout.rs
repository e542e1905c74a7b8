//! Rollout status evaluation
//!
//! A pure classification over the live workload object's reported status,
//! recomputed on every poll. Nothing is retained between polls; the
//! external poller owns the cadence.

use k8s_openapi::api::apps::v1::Deployment;

/// Classified rollout progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutStatus {
    InProgress,
    Success,
    Failed,
}

/// Name and image of one container in the pod template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerImage {
    pub name: String,
    pub image: String,
}

/// Read-only snapshot of a rollout, for classification and display.
#[derive(Debug, Clone)]
pub struct RolloutView {
    pub status: RolloutStatus,
    pub reason: String,
    pub desired: i32,
    pub current: i32,
    pub updated: i32,
    pub available: i32,
    pub containers: Vec<ContainerImage>,
}

/// Condition reason the control plane reports when a rollout ran out of
/// progress deadline.
const PROGRESS_DEADLINE_EXCEEDED: &str = "ProgressDeadlineExceeded";

/// Evaluate the rollout state of a live workload object.
pub fn evaluate(deployment: &Deployment) -> RolloutView {
    let spec = deployment.spec.as_ref();
    let status = deployment.status.as_ref();

    let desired = spec.and_then(|s| s.replicas).unwrap_or(1);
    let generation = deployment.metadata.generation.unwrap_or(0);
    let observed = status.and_then(|s| s.observed_generation).unwrap_or(0);
    let updated = status.and_then(|s| s.updated_replicas).unwrap_or(0);
    let current = status.and_then(|s| s.replicas).unwrap_or(0);
    let available = status.and_then(|s| s.available_replicas).unwrap_or(0);

    let deadline_exceeded = status
        .and_then(|s| s.conditions.as_ref())
        .map(|conditions| {
            conditions.iter().any(|c| {
                c.type_ == "Progressing" && c.reason.as_deref() == Some(PROGRESS_DEADLINE_EXCEEDED)
            })
        })
        .unwrap_or(false);

    let (status, reason) = classify(
        generation,
        observed,
        desired,
        updated,
        current,
        available,
        deadline_exceeded,
    );

    RolloutView {
        status,
        reason,
        desired,
        current,
        updated,
        available,
        containers: containers(deployment),
    }
}

/// The classification itself, separated from field extraction so every
/// branch is directly testable.
#[allow(clippy::too_many_arguments)]
fn classify(
    generation: i64,
    observed: i64,
    desired: i32,
    updated: i32,
    current: i32,
    available: i32,
    deadline_exceeded: bool,
) -> (RolloutStatus, String) {
    if observed < generation {
        return (
            RolloutStatus::InProgress,
            "waiting for the control plane to observe the latest desired state".to_string(),
        );
    }

    if deadline_exceeded {
        return (
            RolloutStatus::Failed,
            "progress deadline exceeded".to_string(),
        );
    }

    if updated < desired {
        return (
            RolloutStatus::InProgress,
            format!("{} of {} new replicas updated", updated, desired),
        );
    }

    if current > updated {
        return (
            RolloutStatus::InProgress,
            format!("{} old replicas pending termination", current - updated),
        );
    }

    if available < updated {
        return (
            RolloutStatus::InProgress,
            format!("{} of {} updated replicas available", available, updated),
        );
    }

    if updated == desired && current == desired && available == desired {
        (RolloutStatus::Success, "rollout complete".to_string())
    } else {
        (
            RolloutStatus::InProgress,
            format!(
                "{} updated, {} total, {} available, want {}",
                updated, current, available, desired
            ),
        )
    }
}

fn containers(deployment: &Deployment) -> Vec<ContainerImage> {
    deployment
        .spec
        .as_ref()
        .and_then(|s| s.template.spec.as_ref())
        .map(|pod| {
            pod.containers
                .iter()
                .map(|c| ContainerImage {
                    name: c.name.clone(),
                    image: c.image.clone().unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::apps::v1::{DeploymentCondition, DeploymentSpec, DeploymentStatus};
    use k8s_openapi::api::core::v1::{Container, PodSpec, PodTemplateSpec};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn deployment(
        generation: i64,
        observed: i64,
        desired: i32,
        updated: i32,
        total: i32,
        available: i32,
    ) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                name: Some("app".to_string()),
                generation: Some(generation),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                replicas: Some(desired),
                template: PodTemplateSpec {
                    spec: Some(PodSpec {
                        containers: vec![Container {
                            name: "app".to_string(),
                            image: Some("registry.example.com/app:1.0".to_string()),
                            ..Default::default()
                        }],
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                ..Default::default()
            }),
            status: Some(DeploymentStatus {
                observed_generation: Some(observed),
                updated_replicas: Some(updated),
                replicas: Some(total),
                available_replicas: Some(available),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_unobserved_generation_is_in_progress() {
        // Regardless of replica counts
        let view = evaluate(&deployment(3, 2, 4, 4, 4, 4));
        assert_eq!(view.status, RolloutStatus::InProgress);
        assert!(view.reason.contains("observe"));
    }

    #[test]
    fn test_all_counts_equal_is_success() {
        let view = evaluate(&deployment(3, 3, 4, 4, 4, 4));
        assert_eq!(view.status, RolloutStatus::Success);
        assert_eq!(view.reason, "rollout complete");
    }

    #[test]
    fn test_lagging_updated_replicas() {
        let view = evaluate(&deployment(3, 3, 4, 3, 4, 4));
        assert_eq!(view.status, RolloutStatus::InProgress);
        assert!(view.reason.contains("updated"));
        assert!(view.reason.contains("3 of 4"));
    }

    #[test]
    fn test_old_replicas_pending_termination() {
        let view = evaluate(&deployment(3, 3, 4, 4, 6, 4));
        assert_eq!(view.status, RolloutStatus::InProgress);
        assert!(view.reason.contains("2 old replicas pending termination"));
    }

    #[test]
    fn test_unavailable_updated_replicas() {
        let view = evaluate(&deployment(3, 3, 4, 4, 4, 2));
        assert_eq!(view.status, RolloutStatus::InProgress);
        assert!(view.reason.contains("2 of 4 updated replicas available"));
    }

    #[test]
    fn test_progress_deadline_exceeded_is_failed() {
        let mut d = deployment(3, 3, 4, 2, 4, 2);
        d.status.as_mut().unwrap().conditions = Some(vec![DeploymentCondition {
            type_: "Progressing".to_string(),
            status: "False".to_string(),
            reason: Some("ProgressDeadlineExceeded".to_string()),
            ..Default::default()
        }]);

        let view = evaluate(&d);
        assert_eq!(view.status, RolloutStatus::Failed);
    }

    #[test]
    fn test_view_carries_counts_and_containers() {
        let view = evaluate(&deployment(3, 3, 4, 4, 4, 4));
        assert_eq!(view.desired, 4);
        assert_eq!(view.current, 4);
        assert_eq!(view.updated, 4);
        assert_eq!(view.available, 4);
        assert_eq!(view.containers.len(), 1);
        assert_eq!(view.containers[0].name, "app");
        assert_eq!(view.containers[0].image, "registry.example.com/app:1.0");
    }

    #[test]
    fn test_missing_status_is_in_progress() {
        let mut d = deployment(1, 0, 2, 0, 0, 0);
        d.status = None;

        let view = evaluate(&d);
        assert_eq!(view.status, RolloutStatus::InProgress);
    }
}
