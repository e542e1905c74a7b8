//! Object stores - the control-plane capability per object kind
//!
//! The reconciling applier operates generically over a single capability
//! set per object kind: get-by-name, create, update, delete. The capability
//! is implemented once for the real control plane ([`ClusterStore`]) and
//! once in memory ([`MemoryStore`]) so the apply/teardown/migration logic
//! can be exercised without a cluster.

mod cluster;
mod memory;

pub use cluster::ClusterStore;
pub use memory::{MemoryControlPlane, MemoryStore, OperationCounts};

use async_trait::async_trait;

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{ConfigMap, Secret, Service, ServiceAccount};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::api::rbac::v1::RoleBinding;

use crate::error::Result;

/// Capability set for one object kind in one namespace.
///
/// Not-found is modelled as `Ok(None)` on get and `Ok(false)` on delete;
/// only genuine control-plane failures are errors at this layer.
#[async_trait]
pub trait ObjectStore<K>: Send + Sync {
    /// Fetch the object with the given name, if it exists
    async fn get(&self, name: &str) -> Result<Option<K>>;

    /// Submit a new object
    async fn create(&self, object: &K) -> Result<K>;

    /// Replace an existing object; the submitted object must carry the
    /// current version token or the control plane rejects the update
    async fn update(&self, object: &K) -> Result<K>;

    /// Delete by name; returns false when the object did not exist
    async fn delete(&self, name: &str) -> Result<bool>;
}

/// All object-kind capabilities for one namespace.
pub struct ControlPlane {
    pub services: Box<dyn ObjectStore<Service>>,
    pub workloads: Box<dyn ObjectStore<Deployment>>,
    pub secrets: Box<dyn ObjectStore<Secret>>,
    pub service_accounts: Box<dyn ObjectStore<ServiceAccount>>,
    pub role_bindings: Box<dyn ObjectStore<RoleBinding>>,
    pub autoscalers: Box<dyn ObjectStore<HorizontalPodAutoscaler>>,
    pub ingresses: Box<dyn ObjectStore<Ingress>>,
    pub config_maps: Box<dyn ObjectStore<ConfigMap>>,
}

impl ControlPlane {
    /// Capabilities backed by the real control plane.
    pub fn cluster(client: kube::Client, namespace: &str) -> Self {
        Self {
            services: Box::new(ClusterStore::new(client.clone(), namespace)),
            workloads: Box::new(ClusterStore::new(client.clone(), namespace)),
            secrets: Box::new(ClusterStore::new(client.clone(), namespace)),
            service_accounts: Box::new(ClusterStore::new(client.clone(), namespace)),
            role_bindings: Box::new(ClusterStore::new(client.clone(), namespace)),
            autoscalers: Box::new(ClusterStore::new(client.clone(), namespace)),
            ingresses: Box::new(ClusterStore::new(client.clone(), namespace)),
            config_maps: Box::new(ClusterStore::new(client, namespace)),
        }
    }
}
