//! High-level deployer facade
//!
//! Chains the whole flow for one deployment request: resolve the manifest,
//! bind external resources, synthesize the object set and apply it against
//! the target namespace. Each step is synchronous with respect to the
//! next; there is no internal parallelism, and remote-call failures are
//! surfaced immediately to the caller.

use kube::api::Api;
use tracing::info;

use k8s_openapi::api::apps::v1::Deployment;

use stevedore_core::DeployRequest;
use stevedore_manifest::ManifestResolver;
use stevedore_registry::{BindingScope, RegistryClient, RegistryConfig, ResourceBinder};

use crate::apply::{Applier, ApplyReport};
use crate::error::{KubeError, Result};
use crate::migrate::{ClusterPodLister, KindOutcome, MigrationConfig, MigrationOutcome, Migrator};
use crate::rollout::{RolloutView, evaluate};
use crate::store::ControlPlane;
use crate::synthesis::Synthesizer;

/// Result of one deployment attempt.
pub struct DeployOutcome {
    pub manifest: stevedore_core::ApplicationManifest,
    pub report: ApplyReport,
}

/// Drives deployments against one cluster.
pub struct Deployer {
    client: kube::Client,
    resolver: ManifestResolver,
    registry: RegistryConfig,
    synthesizer: Synthesizer,
}

impl Deployer {
    pub fn new(
        client: kube::Client,
        resolver: ManifestResolver,
        registry: RegistryConfig,
        synthesizer: Synthesizer,
    ) -> Self {
        Self {
            client,
            resolver,
            registry,
            synthesizer,
        }
    }

    /// Run the full deployment flow for one request.
    pub async fn deploy(&self, request: &DeployRequest) -> Result<DeployOutcome> {
        let manifest = self
            .resolver
            .resolve(
                &request.application,
                &request.version,
                request.manifest_location.as_deref(),
            )
            .await?;
        info!(
            application = %request.application,
            version = %request.version,
            "manifest resolved and validated"
        );

        let resources = if request.skip_resource_binding {
            Vec::new()
        } else {
            let binder = ResourceBinder::new(RegistryClient::new(
                self.registry.clone(),
                request.credentials.clone(),
            ));
            let scope = BindingScope {
                environment: request.environment.clone(),
                application: request.application.clone(),
                zone: request.zone.clone(),
            };

            let mut resources = binder.bind(&manifest.used_resources, &scope).await?;
            if let Some(load_balancer) = binder.load_balancer_ingress(&scope).await {
                resources.push(load_balancer);
            }
            resources
        };
        info!(
            application = %request.application,
            resources = resources.len(),
            "resources bound"
        );

        let set = self.synthesizer.synthesize(request, &manifest, &resources);

        let plane = ControlPlane::cluster(self.client.clone(), &request.namespace);
        let applier = Applier::new(plane, self.synthesizer.config().alerts_config_map.clone());
        let report = applier.apply_all(&set).await;
        info!(
            application = %request.application,
            namespace = %request.namespace,
            summary = %report.summary(),
            "objects applied"
        );

        Ok(DeployOutcome { manifest, report })
    }

    /// Evaluate rollout progress of the live workload.
    pub async fn rollout_status(&self, namespace: &str, application: &str) -> Result<RolloutView> {
        let workloads: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        match workloads.get_opt(application).await.map_err(KubeError::Api)? {
            Some(deployment) => Ok(evaluate(&deployment)),
            None => Err(KubeError::WorkloadNotFound {
                application: application.to_string(),
                namespace: namespace.to_string(),
            }),
        }
    }

    /// Migrate an application away from its old location.
    pub async fn migrate(
        &self,
        application: &str,
        old_namespace: &str,
        new_namespace: &str,
        config: MigrationConfig,
    ) -> Result<MigrationOutcome> {
        let old_plane = ControlPlane::cluster(self.client.clone(), old_namespace);
        let applier = Applier::new(old_plane, self.synthesizer.config().alerts_config_map.clone());
        let pods = ClusterPodLister::new(self.client.clone(), new_namespace);

        Migrator::new(applier, Box::new(pods), new_namespace, config)
            .migrate(application)
            .await
    }

    /// Decommission an application's full object set, service included.
    pub async fn teardown(&self, application: &str, namespace: &str) -> Vec<KindOutcome> {
        let plane = ControlPlane::cluster(self.client.clone(), namespace);
        let applier = Applier::new(plane, self.synthesizer.config().alerts_config_map.clone());
        crate::migrate::teardown(&applier, application, true).await
    }
}
