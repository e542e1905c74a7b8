//! In-memory object store for tests
//!
//! Behaves like the control plane for the operations the applier uses:
//! version tokens are issued on create, bumped on update, and a stale
//! token is rejected with a 409 just like the real API would.

use async_trait::async_trait;
use kube::Resource;
use kube::core::ErrorResponse;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{ConfigMap, Secret, Service, ServiceAccount};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::api::rbac::v1::RoleBinding;

use super::{ControlPlane, ObjectStore};
use crate::error::{KubeError, Result};

/// Counts of operations performed, for test assertions.
#[derive(Debug, Default, Clone)]
pub struct OperationCounts {
    pub gets: usize,
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
}

/// In-memory object store for one kind.
pub struct MemoryStore<K> {
    objects: Arc<RwLock<HashMap<String, K>>>,
    operations: Arc<RwLock<OperationCounts>>,
}

impl<K> Clone for MemoryStore<K> {
    fn clone(&self) -> Self {
        Self {
            objects: Arc::clone(&self.objects),
            operations: Arc::clone(&self.operations),
        }
    }
}

impl<K> Default for MemoryStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> MemoryStore<K> {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            operations: Arc::new(RwLock::new(OperationCounts::default())),
        }
    }

    /// Operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations.read().unwrap().clone()
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().unwrap().is_empty()
    }
}

impl<K: Clone> MemoryStore<K> {
    /// Create with pre-populated objects, keyed by name.
    pub fn with_objects(objects: Vec<(String, K)>) -> Self {
        let store = Self::new();
        {
            let mut map = store.objects.write().unwrap();
            for (name, object) in objects {
                map.insert(name, object);
            }
        }
        store
    }

    /// Fetch a stored object without counting the access.
    pub fn stored(&self, name: &str) -> Option<K> {
        self.objects.read().unwrap().get(name).cloned()
    }
}

fn api_error(code: u16, reason: &str, message: String) -> KubeError {
    KubeError::Api(kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message,
        reason: reason.to_string(),
        code,
    }))
}

fn bump_version(version: Option<&str>) -> String {
    let current: u64 = version.and_then(|v| v.parse().ok()).unwrap_or(0);
    (current + 1).to_string()
}

#[async_trait]
impl<K> ObjectStore<K> for MemoryStore<K>
where
    K: Resource + Clone + Send + Sync,
{
    async fn get(&self, name: &str) -> Result<Option<K>> {
        self.operations.write().unwrap().gets += 1;
        Ok(self.objects.read().unwrap().get(name).cloned())
    }

    async fn create(&self, object: &K) -> Result<K> {
        self.operations.write().unwrap().creates += 1;

        let name = object
            .meta()
            .name
            .clone()
            .ok_or(KubeError::MissingObjectName)?;

        let mut objects = self.objects.write().unwrap();
        if objects.contains_key(&name) {
            return Err(api_error(
                409,
                "AlreadyExists",
                format!("object '{}' already exists", name),
            ));
        }

        let mut stored = object.clone();
        stored.meta_mut().resource_version = Some("1".to_string());
        objects.insert(name, stored.clone());
        Ok(stored)
    }

    async fn update(&self, object: &K) -> Result<K> {
        self.operations.write().unwrap().updates += 1;

        let name = object
            .meta()
            .name
            .clone()
            .ok_or(KubeError::MissingObjectName)?;

        let mut objects = self.objects.write().unwrap();
        let Some(existing) = objects.get(&name) else {
            return Err(api_error(
                404,
                "NotFound",
                format!("object '{}' not found", name),
            ));
        };

        if object.meta().resource_version != existing.meta().resource_version {
            return Err(api_error(
                409,
                "Conflict",
                format!("stale version token for '{}'", name),
            ));
        }

        let mut stored = object.clone();
        stored.meta_mut().resource_version = Some(bump_version(
            existing.meta().resource_version.as_deref(),
        ));
        objects.insert(name, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        self.operations.write().unwrap().deletes += 1;
        Ok(self.objects.write().unwrap().remove(name).is_some())
    }
}

/// A full in-memory control plane; cloning shares the underlying stores so
/// tests can keep handles for assertions while the applier owns a
/// [`ControlPlane`] view.
#[derive(Clone, Default)]
pub struct MemoryControlPlane {
    pub services: MemoryStore<Service>,
    pub workloads: MemoryStore<Deployment>,
    pub secrets: MemoryStore<Secret>,
    pub service_accounts: MemoryStore<ServiceAccount>,
    pub role_bindings: MemoryStore<RoleBinding>,
    pub autoscalers: MemoryStore<HorizontalPodAutoscaler>,
    pub ingresses: MemoryStore<Ingress>,
    pub config_maps: MemoryStore<ConfigMap>,
}

impl MemoryControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    /// A [`ControlPlane`] view over these stores.
    pub fn control_plane(&self) -> ControlPlane {
        ControlPlane {
            services: Box::new(self.services.clone()),
            workloads: Box::new(self.workloads.clone()),
            secrets: Box::new(self.secrets.clone()),
            service_accounts: Box::new(self.service_accounts.clone()),
            role_bindings: Box::new(self.role_bindings.clone()),
            autoscalers: Box::new(self.autoscalers.clone()),
            ingresses: Box::new(self.ingresses.clone()),
            config_maps: Box::new(self.config_maps.clone()),
        }
    }
}
