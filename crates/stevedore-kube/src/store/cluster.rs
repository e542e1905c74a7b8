//! Control-plane-backed object store

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, DeleteParams, PostParams};
use kube::{Client, Resource};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

use super::ObjectStore;
use crate::error::{KubeError, Result};

/// Object store backed by a namespaced Kubernetes API.
pub struct ClusterStore<K>
where
    K: Resource<Scope = NamespaceResourceScope>,
{
    api: Api<K>,
}

impl<K> ClusterStore<K>
where
    K: Resource<Scope = NamespaceResourceScope>,
    K::DynamicType: Default,
{
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
        }
    }
}

#[async_trait]
impl<K> ObjectStore<K> for ClusterStore<K>
where
    K: Resource<Scope = NamespaceResourceScope>
        + Clone
        + DeserializeOwned
        + Serialize
        + Debug
        + Send
        + Sync,
    K::DynamicType: Default,
{
    async fn get(&self, name: &str) -> Result<Option<K>> {
        self.api.get_opt(name).await.map_err(KubeError::Api)
    }

    async fn create(&self, object: &K) -> Result<K> {
        self.api
            .create(&PostParams::default(), object)
            .await
            .map_err(KubeError::Api)
    }

    async fn update(&self, object: &K) -> Result<K> {
        let name = object
            .meta()
            .name
            .clone()
            .ok_or(KubeError::MissingObjectName)?;
        self.api
            .replace(&name, &PostParams::default(), object)
            .await
            .map_err(KubeError::Api)
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        match self.api.delete(name, &DeleteParams::default()).await {
            Ok(_) => Ok(true),
            Err(kube::Error::Api(resp)) if resp.code == 404 => Ok(false),
            Err(e) => Err(KubeError::Api(e)),
        }
    }
}
