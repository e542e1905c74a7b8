//! Reconciling applier
//!
//! Every object is applied the same way: look up the existing same-named
//! object, create when absent, otherwise update carrying the existing
//! object's version token so the control plane can reject a lost-update
//! race. The full desired object is always submitted; the control plane
//! owns the diff.

use kube::Resource;
use tracing::debug;

use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::error::{KubeError, Result};
use crate::store::{ControlPlane, ObjectStore};
use crate::synthesis::{AlertEntry, TargetObjectSet};

/// How an object was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Created,
    Updated,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Created => write!(f, "created"),
            Operation::Updated => write!(f, "updated"),
        }
    }
}

/// Outcome of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

impl std::fmt::Display for DeleteOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeleteOutcome::Deleted => write!(f, "deleted"),
            DeleteOutcome::NotFound => write!(f, "not found"),
        }
    }
}

/// One successfully applied object.
#[derive(Debug, Clone)]
pub struct AppliedKind {
    pub kind: String,
    pub name: String,
    pub operation: Operation,
}

/// One object whose apply failed.
#[derive(Debug, Clone)]
pub struct FailedKind {
    pub kind: String,
    pub name: String,
    pub error: String,
}

/// Aggregated per-kind outcome of applying a [`TargetObjectSet`].
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub applied: Vec<AppliedKind>,
    pub failed: Vec<FailedKind>,
}

impl ApplyReport {
    /// The deployment attempt fully succeeded
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn created(&self) -> usize {
        self.applied
            .iter()
            .filter(|a| a.operation == Operation::Created)
            .count()
    }

    pub fn updated(&self) -> usize {
        self.applied
            .iter()
            .filter(|a| a.operation == Operation::Updated)
            .count()
    }

    /// Human-readable one-line summary
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.applied.is_empty() {
            parts.push(format!(
                "{} applied ({} created, {} updated)",
                self.applied.len(),
                self.created(),
                self.updated()
            ));
        }
        if !self.failed.is_empty() {
            parts.push(format!("{} failed", self.failed.len()));
        }
        if parts.is_empty() {
            "no objects processed".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Apply one desired object against its store.
///
/// The create-vs-update lookup failure aborts this object's apply;
/// ambiguous existing state is unsafe to proceed past.
pub async fn apply_object<K>(store: &dyn ObjectStore<K>, mut desired: K) -> Result<(K, Operation)>
where
    K: Resource + Clone + Send + Sync,
    K::DynamicType: Default,
{
    let kind = K::kind(&K::DynamicType::default()).to_string();
    let name = desired
        .meta()
        .name
        .clone()
        .ok_or(KubeError::MissingObjectName)?;

    let existing = store
        .get(&name)
        .await
        .map_err(|e| KubeError::ExistingLookup {
            kind: kind.clone(),
            name: name.clone(),
            message: e.to_string(),
        })?;

    match existing {
        None => {
            let created = store
                .create(&desired)
                .await
                .map_err(|e| tag_apply(e, &kind, &name))?;
            debug!(%kind, %name, "created object");
            Ok((created, Operation::Created))
        }
        Some(current) => {
            // Carry the version token forward so a concurrent writer is
            // detected by the control plane
            desired.meta_mut().resource_version = current.meta().resource_version.clone();
            let updated = store
                .update(&desired)
                .await
                .map_err(|e| tag_apply(e, &kind, &name))?;
            debug!(%kind, %name, "updated object");
            Ok((updated, Operation::Updated))
        }
    }
}

/// Delete one object by name. Deleting an object that does not exist is
/// success, not an error.
pub async fn delete_object<K>(store: &dyn ObjectStore<K>, name: &str) -> Result<DeleteOutcome>
where
    K: Resource + Clone + Send + Sync,
    K::DynamicType: Default,
{
    let kind = K::kind(&K::DynamicType::default()).to_string();
    match store.delete(name).await {
        Ok(true) => Ok(DeleteOutcome::Deleted),
        Ok(false) => Ok(DeleteOutcome::NotFound),
        Err(e) => Err(KubeError::Delete {
            kind,
            name: name.to_string(),
            message: e.to_string(),
        }),
    }
}

fn tag_apply(err: KubeError, kind: &str, name: &str) -> KubeError {
    if err.is_conflict() {
        KubeError::Conflict {
            kind: kind.to_string(),
            name: name.to_string(),
        }
    } else {
        KubeError::Apply {
            kind: kind.to_string(),
            name: name.to_string(),
            message: err.to_string(),
        }
    }
}

/// Applies a whole [`TargetObjectSet`] against one namespace.
pub struct Applier {
    plane: ControlPlane,
    alerts_config_map: String,
}

impl Applier {
    pub fn new(plane: ControlPlane, alerts_config_map: impl Into<String>) -> Self {
        Self {
            plane,
            alerts_config_map: alerts_config_map.into(),
        }
    }

    /// Apply every object in the set, in dependency order, collecting
    /// per-kind outcomes rather than aborting on the first failing kind.
    pub async fn apply_all(&self, set: &TargetObjectSet) -> ApplyReport {
        let mut report = ApplyReport::default();

        apply_into(
            &mut report,
            self.plane.service_accounts.as_ref(),
            set.service_account.clone(),
        )
        .await;
        if let Some(role_binding) = &set.role_binding {
            apply_into(
                &mut report,
                self.plane.role_bindings.as_ref(),
                role_binding.clone(),
            )
            .await;
        }
        apply_into(&mut report, self.plane.secrets.as_ref(), set.secret.clone()).await;
        apply_into(&mut report, self.plane.services.as_ref(), set.service.clone()).await;
        apply_into(&mut report, self.plane.workloads.as_ref(), set.workload.clone()).await;
        if let Some(autoscaler) = &set.autoscaler {
            apply_into(
                &mut report,
                self.plane.autoscalers.as_ref(),
                autoscaler.clone(),
            )
            .await;
        }
        if let Some(ingress) = &set.ingress {
            apply_into(&mut report, self.plane.ingresses.as_ref(), ingress.clone()).await;
        }
        if let Some(cache_workload) = &set.cache_workload {
            apply_into(
                &mut report,
                self.plane.workloads.as_ref(),
                cache_workload.clone(),
            )
            .await;
        }
        if let Some(cache_service) = &set.cache_service {
            apply_into(
                &mut report,
                self.plane.services.as_ref(),
                cache_service.clone(),
            )
            .await;
        }
        if let Some(alert_entry) = &set.alert_entry {
            let namespace = set.workload.metadata.namespace.clone().unwrap_or_default();
            match self.apply_alert_entry(&namespace, alert_entry).await {
                Ok(operation) => report.applied.push(AppliedKind {
                    kind: "ConfigMap".to_string(),
                    name: self.alerts_config_map.clone(),
                    operation,
                }),
                Err(e) => report.failed.push(FailedKind {
                    kind: "ConfigMap".to_string(),
                    name: self.alerts_config_map.clone(),
                    error: e.to_string(),
                }),
            }
        }

        report
    }

    /// Upsert one application's entry in the shared alert-rules config.
    pub async fn apply_alert_entry(
        &self,
        namespace: &str,
        entry: &AlertEntry,
    ) -> Result<Operation> {
        let store = self.plane.config_maps.as_ref();
        match store.get(&self.alerts_config_map).await? {
            None => {
                let mut data = std::collections::BTreeMap::new();
                data.insert(entry.key.clone(), entry.value.clone());
                let config_map = ConfigMap {
                    metadata: ObjectMeta {
                        name: Some(self.alerts_config_map.clone()),
                        namespace: Some(namespace.to_string()),
                        ..Default::default()
                    },
                    data: Some(data),
                    ..Default::default()
                };
                store.create(&config_map).await?;
                Ok(Operation::Created)
            }
            Some(mut config_map) => {
                config_map
                    .data
                    .get_or_insert_with(Default::default)
                    .insert(entry.key.clone(), entry.value.clone());
                store.update(&config_map).await?;
                Ok(Operation::Updated)
            }
        }
    }

    /// Remove one application's entry from the shared alert-rules config.
    pub async fn remove_alert_entry(&self, key: &str) -> Result<DeleteOutcome> {
        let store = self.plane.config_maps.as_ref();
        match store.get(&self.alerts_config_map).await? {
            None => Ok(DeleteOutcome::NotFound),
            Some(mut config_map) => {
                let removed = config_map
                    .data
                    .as_mut()
                    .map(|data| data.remove(key).is_some())
                    .unwrap_or(false);
                if !removed {
                    return Ok(DeleteOutcome::NotFound);
                }
                store.update(&config_map).await?;
                Ok(DeleteOutcome::Deleted)
            }
        }
    }

    pub fn plane(&self) -> &ControlPlane {
        &self.plane
    }
}

/// Apply one object and record the outcome in the report.
async fn apply_into<K>(report: &mut ApplyReport, store: &dyn ObjectStore<K>, desired: K)
where
    K: Resource + Clone + Send + Sync,
    K::DynamicType: Default,
{
    let kind = K::kind(&K::DynamicType::default()).to_string();
    let name = desired.meta().name.clone().unwrap_or_default();

    match apply_object(store, desired).await {
        Ok((_, operation)) => report.applied.push(AppliedKind {
            kind,
            name,
            operation,
        }),
        Err(e) => report.failed.push(FailedKind {
            kind,
            name,
            error: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryControlPlane, MemoryStore};
    use crate::synthesis::{Synthesizer, SynthesizerConfig};
    use k8s_openapi::api::core::v1::Service;
    use stevedore_core::{DeployRequest, merge_with_defaults};

    fn service(name: &str) -> Service {
        Service {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn basic_set() -> TargetObjectSet {
        let request = DeployRequest::new("app", "version", "ns").skip_resource_binding();
        let manifest = merge_with_defaults(serde_json::json!({
            "image": "registry.example.com/app",
            "replicas": { "min": 2, "max": 4, "cpuThresholdPercentage": 50 }
        }))
        .unwrap();
        Synthesizer::new(SynthesizerConfig::default()).synthesize(&request, &manifest, &[])
    }

    #[tokio::test]
    async fn test_apply_object_creates_then_updates() {
        let store: MemoryStore<Service> = MemoryStore::new();

        let (_, first) = apply_object(&store, service("orders")).await.unwrap();
        assert_eq!(first, Operation::Created);

        // Second apply of the identical object is an update, not a second
        // create, and leaves exactly one stored object
        let (_, second) = apply_object(&store, service("orders")).await.unwrap();
        assert_eq!(second, Operation::Updated);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_apply_object_carries_version_token() {
        let store: MemoryStore<Service> = MemoryStore::new();
        apply_object(&store, service("orders")).await.unwrap();
        apply_object(&store, service("orders")).await.unwrap();

        // Version token was refreshed, so the second apply bumped 1 -> 2
        let stored = store.stored("orders").unwrap();
        assert_eq!(stored.metadata.resource_version.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_delete_missing_object_is_not_found() {
        let store: MemoryStore<Service> = MemoryStore::new();
        let outcome = delete_object(&store, "orders").await.unwrap();
        assert_eq!(outcome, DeleteOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_minimal_set_applies_as_four_creates() {
        let memory = MemoryControlPlane::new();
        let applier = Applier::new(memory.control_plane(), "alert-rules");

        let report = applier.apply_all(&basic_set()).await;

        assert!(report.is_success());
        assert_eq!(report.created(), 4);
        assert_eq!(report.updated(), 0);

        // Exactly one service, workload, secret and service account, each
        // named after the application, in the requested namespace
        for (kind, expected) in [
            ("Service", memory.services.len()),
            ("Deployment", memory.workloads.len()),
            ("Secret", memory.secrets.len()),
            ("ServiceAccount", memory.service_accounts.len()),
        ] {
            assert_eq!(expected, 1, "{} count", kind);
        }
        assert_eq!(
            memory.services.stored("app").unwrap().metadata.namespace,
            Some("ns".to_string())
        );
        assert!(memory.role_bindings.is_empty());
        assert!(memory.autoscalers.is_empty());
        assert!(memory.ingresses.is_empty());
    }

    #[tokio::test]
    async fn test_reapplying_set_is_all_updates() {
        let memory = MemoryControlPlane::new();
        let applier = Applier::new(memory.control_plane(), "alert-rules");
        let set = basic_set();

        applier.apply_all(&set).await;
        let second = applier.apply_all(&set).await;

        assert!(second.is_success());
        assert_eq!(second.created(), 0);
        assert_eq!(second.updated(), 4);
        assert_eq!(memory.services.len(), 1);
        assert_eq!(memory.workloads.len(), 1);
    }

    #[tokio::test]
    async fn test_alert_entry_round_trip() {
        let memory = MemoryControlPlane::new();
        let applier = Applier::new(memory.control_plane(), "alert-rules");

        let entry = AlertEntry {
            key: "app.yml".to_string(),
            value: "groups: []\n".to_string(),
        };

        let first = applier.apply_alert_entry("ns", &entry).await.unwrap();
        assert_eq!(first, Operation::Created);

        let second = applier.apply_alert_entry("ns", &entry).await.unwrap();
        assert_eq!(second, Operation::Updated);

        let outcome = applier.remove_alert_entry("app.yml").await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);

        let again = applier.remove_alert_entry("app.yml").await.unwrap();
        assert_eq!(again, DeleteOutcome::NotFound);
    }
}
