//! Migration and teardown
//!
//! Replaces an application's previous deployment location without a
//! traffic gap: wait for the new location to come up, rewrite the old
//! service into an external-name alias pointing at the new location, then
//! decommission the old object set best-effort, one kind at a time.

use std::time::Duration;

use async_trait::async_trait;
use kube::api::{Api, ListParams};
use tracing::info;

use k8s_openapi::api::core::v1::{Pod, ServiceSpec};

use crate::apply::{Applier, DeleteOutcome, delete_object};
use crate::error::{KubeError, Result};

/// Bounds for the new-location readiness poll.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Fixed number of poll attempts before giving up
    pub readiness_attempts: u32,

    /// Fixed delay between attempts
    pub readiness_interval: Duration,

    /// Cluster-internal DNS domain used for the redirect target
    pub cluster_domain: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            readiness_attempts: 30,
            readiness_interval: Duration::from_secs(5),
            cluster_domain: "cluster.local".to_string(),
        }
    }
}

/// Counts ready pods for an application at the new location.
#[async_trait]
pub trait PodLister: Send + Sync {
    async fn ready_pods(&self, application: &str) -> Result<usize>;
}

/// Pod lister backed by the real control plane.
pub struct ClusterPodLister {
    pods: Api<Pod>,
}

impl ClusterPodLister {
    pub fn new(client: kube::Client, namespace: &str) -> Self {
        Self {
            pods: Api::namespaced(client, namespace),
        }
    }
}

#[async_trait]
impl PodLister for ClusterPodLister {
    async fn ready_pods(&self, application: &str) -> Result<usize> {
        let params = ListParams::default().labels(&format!("app={}", application));
        let pods = self.pods.list(&params).await.map_err(KubeError::Api)?;

        Ok(pods
            .items
            .iter()
            .filter(|pod| {
                pod.status
                    .as_ref()
                    .and_then(|s| s.conditions.as_ref())
                    .map(|conditions| {
                        conditions
                            .iter()
                            .any(|c| c.type_ == "Ready" && c.status == "True")
                    })
                    .unwrap_or(false)
            })
            .count())
    }
}

/// Fixed-answer pod lister for tests.
pub struct StaticPodLister {
    pub ready: usize,
}

#[async_trait]
impl PodLister for StaticPodLister {
    async fn ready_pods(&self, _application: &str) -> Result<usize> {
        Ok(self.ready)
    }
}

/// One (kind, outcome) line of a teardown.
#[derive(Debug, Clone)]
pub struct KindOutcome {
    pub kind: String,
    pub outcome: String,
}

impl std::fmt::Display for KindOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.outcome)
    }
}

/// Result of a migration attempt.
#[derive(Debug)]
pub enum MigrationOutcome {
    /// No old-location service exists; nothing to migrate
    NothingToMigrate,

    /// The old service is already an external-name alias; a previous
    /// migration already ran
    AlreadyRedirected,

    /// Traffic redirected and the old object set decommissioned
    Migrated {
        redirected_to: String,
        teardown: Vec<KindOutcome>,
    },
}

/// Decommission an application's object set, one kind at a time.
///
/// Never short-circuits: every kind produces an outcome line regardless of
/// prior failures, so the overall operation reports partial progress
/// rather than an opaque single error.
pub async fn teardown(
    applier: &Applier,
    application: &str,
    include_service: bool,
) -> Vec<KindOutcome> {
    let plane = applier.plane();
    let cache_name = format!("{}-cache", application);
    let alert_key = format!("{}.yml", application);
    let mut outcomes = Vec::new();

    outcomes.push(outcome(
        "Deployment",
        delete_object(plane.workloads.as_ref(), application).await,
    ));
    outcomes.push(outcome(
        "HorizontalPodAutoscaler",
        delete_object(plane.autoscalers.as_ref(), application).await,
    ));
    outcomes.push(outcome(
        "AlertRules",
        applier.remove_alert_entry(&alert_key).await,
    ));
    outcomes.push(outcome(
        "Ingress",
        delete_object(plane.ingresses.as_ref(), application).await,
    ));
    outcomes.push(outcome(
        "CacheWorkload",
        delete_object(plane.workloads.as_ref(), &cache_name).await,
    ));
    outcomes.push(outcome(
        "CacheService",
        delete_object(plane.services.as_ref(), &cache_name).await,
    ));
    outcomes.push(outcome(
        "Secret",
        delete_object(plane.secrets.as_ref(), application).await,
    ));
    outcomes.push(outcome(
        "ServiceAccount",
        delete_object(plane.service_accounts.as_ref(), application).await,
    ));
    outcomes.push(outcome(
        "RoleBinding",
        delete_object(plane.role_bindings.as_ref(), application).await,
    ));
    if include_service {
        outcomes.push(outcome(
            "Service",
            delete_object(plane.services.as_ref(), application).await,
        ));
    }

    outcomes
}

fn outcome(kind: &str, result: Result<DeleteOutcome>) -> KindOutcome {
    KindOutcome {
        kind: kind.to_string(),
        outcome: match result {
            Ok(outcome) => outcome.to_string(),
            Err(e) => format!("failed: {}", e),
        },
    }
}

/// Drives the old-location migration for one application.
pub struct Migrator {
    old: Applier,
    new_pods: Box<dyn PodLister>,
    new_namespace: String,
    config: MigrationConfig,
}

impl Migrator {
    pub fn new(
        old: Applier,
        new_pods: Box<dyn PodLister>,
        new_namespace: impl Into<String>,
        config: MigrationConfig,
    ) -> Self {
        Self {
            old,
            new_pods,
            new_namespace: new_namespace.into(),
            config,
        }
    }

    /// Migrate traffic away from the old location, then decommission it.
    ///
    /// If readiness at the new location is never observed the migration
    /// aborts and the old instance is preserved; a traffic blackhole is
    /// worse than a stale instance.
    pub async fn migrate(&self, application: &str) -> Result<MigrationOutcome> {
        let services = self.old.plane().services.as_ref();

        let Some(mut service) = services.get(application).await? else {
            return Ok(MigrationOutcome::NothingToMigrate);
        };

        let service_type = service.spec.as_ref().and_then(|s| s.type_.as_deref());
        if service_type == Some("ExternalName") {
            return Ok(MigrationOutcome::AlreadyRedirected);
        }

        self.await_new_location_ready(application).await?;

        // Rewrite rather than delete: old clients resolving the old service
        // name keep working, now routed to the new instance
        let target = format!(
            "{}.{}.svc.{}",
            application, self.new_namespace, self.config.cluster_domain
        );
        service.spec = Some(ServiceSpec {
            type_: Some("ExternalName".to_string()),
            external_name: Some(target.clone()),
            ..Default::default()
        });
        services.update(&service).await?;
        info!(application, %target, "redirected old-location service");

        let teardown = teardown(&self.old, application, false).await;

        Ok(MigrationOutcome::Migrated {
            redirected_to: target,
            teardown,
        })
    }

    async fn await_new_location_ready(&self, application: &str) -> Result<()> {
        for attempt in 1..=self.config.readiness_attempts {
            if self.new_pods.ready_pods(application).await? > 0 {
                return Ok(());
            }
            if attempt < self.config.readiness_attempts {
                tokio::time::sleep(self.config.readiness_interval).await;
            }
        }

        Err(KubeError::ReadinessTimeout {
            application: application.to_string(),
            attempts: self.config.readiness_attempts,
        })
    }
}
