//! Resource binder
//!
//! Resolves every used-resource reference, one alias at a time, into the
//! uniform [`ResolvedResource`] view. Binding is all-or-nothing; only the
//! load-balancer lookup is best-effort.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use stevedore_core::UsedResource;

use crate::client::RegistryClient;
use crate::descriptor::ResourceDescriptor;
use crate::error::Result;
use crate::resolved::ResolvedResource;
use crate::{KIND_APPLICATION_PROPERTIES, KIND_CERTIFICATE, KIND_LOAD_BALANCER_CONFIG};

/// Property key holding the combined application-properties blob.
const APPLICATION_PROPERTIES_KEY: &str = "applicationProperties";

/// Secret slot name surfaced to the synthesizer.
const SECRET_KEY: &str = "password";

/// Scope of one binding operation.
#[derive(Debug, Clone)]
pub struct BindingScope {
    pub environment: String,
    pub application: String,
    pub zone: String,
}

/// Binds used resources against the registry.
pub struct ResourceBinder {
    client: RegistryClient,
}

impl ResourceBinder {
    pub fn new(client: RegistryClient) -> Self {
        Self { client }
    }

    /// Bind every used resource. A hard failure for any alias aborts the
    /// whole operation.
    pub async fn bind(
        &self,
        used: &[UsedResource],
        scope: &BindingScope,
    ) -> Result<Vec<ResolvedResource>> {
        let mut resolved = Vec::with_capacity(used.len());

        for reference in used {
            let resource = self.bind_one(reference, scope).await?;
            debug!(
                alias = %reference.alias,
                kind = %reference.kind,
                properties = resource.properties.len(),
                "bound resource"
            );
            resolved.push(resource);
        }

        Ok(resolved)
    }

    async fn bind_one(
        &self,
        reference: &UsedResource,
        scope: &BindingScope,
    ) -> Result<ResolvedResource> {
        let descriptor = self
            .client
            .lookup_resource(
                &reference.alias,
                &reference.kind,
                &scope.environment,
                &scope.application,
                &scope.zone,
            )
            .await?;

        let mut resource = ResolvedResource::new(&reference.alias, &reference.kind);
        resource.properties = descriptor.properties.clone();

        if reference.kind == KIND_APPLICATION_PROPERTIES {
            explode_application_properties(&mut resource.properties);
        }

        apply_property_map(&mut resource.properties, &reference.property_map);

        // Only the first secret slot is used
        if let Some((_, secret_ref)) = descriptor.secrets.iter().next() {
            let value = self
                .client
                .fetch_secret(&reference.alias, &secret_ref.reference)
                .await?;
            resource.secrets.insert(SECRET_KEY.to_string(), value);
        }

        if reference.kind == KIND_CERTIFICATE {
            for file in descriptor.files.values() {
                let content = self.client.fetch_file(&reference.alias, file).await?;
                resource
                    .certificates
                    .insert(format!("{}_{}", reference.alias, file.filename), content);
            }
        }

        Ok(resource)
    }

    /// Best-effort lookup of the load-balancer/ingress configuration.
    ///
    /// A missing or malformed configuration never aborts the deployment;
    /// it is logged and the deployment proceeds without ingress rules from
    /// this source.
    pub async fn load_balancer_ingress(&self, scope: &BindingScope) -> Option<ResolvedResource> {
        let descriptors = match self
            .client
            .lookup_load_balancer(&scope.environment, &scope.application)
            .await
        {
            Ok(descriptors) => descriptors,
            Err(err) => {
                warn!(
                    application = %scope.application,
                    environment = %scope.environment,
                    error = %err,
                    "load-balancer lookup failed, continuing without it"
                );
                return None;
            }
        };

        let ingresses = parse_load_balancer(&descriptors);
        if ingresses.is_empty() {
            warn!(
                application = %scope.application,
                environment = %scope.environment,
                "no usable load-balancer configuration found"
            );
            return None;
        }

        let mut resource =
            ResolvedResource::new(KIND_LOAD_BALANCER_CONFIG, KIND_LOAD_BALANCER_CONFIG);
        resource.ingresses = ingresses;
        Some(resource)
    }
}

/// Explode the combined `applicationProperties` blob into individual
/// properties and drop the combined one. Lines are CRLF-separated
/// `key=value` pairs; lines without a separator are ignored.
fn explode_application_properties(properties: &mut BTreeMap<String, String>) {
    let Some(blob) = properties.remove(APPLICATION_PROPERTIES_KEY) else {
        return;
    };

    for line in blob.split("\r\n") {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            properties.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
}

/// Rename property keys per the manifest's property-name remap.
fn apply_property_map(
    properties: &mut BTreeMap<String, String>,
    property_map: &BTreeMap<String, String>,
) {
    for (from, to) in property_map {
        if let Some(value) = properties.remove(from) {
            properties.insert(to.clone(), value);
        }
    }
}

/// Parse load-balancer descriptors into a host -> context-root map.
fn parse_load_balancer(descriptors: &[ResourceDescriptor]) -> BTreeMap<String, String> {
    let mut ingresses = BTreeMap::new();

    for descriptor in descriptors {
        let host = descriptor.properties.get("url");
        let context_root = descriptor.properties.get("contextRoots");
        match (host, context_root) {
            (Some(host), Some(root)) if !host.is_empty() => {
                ingresses.insert(host.clone(), root.clone());
            }
            _ => {
                warn!(
                    alias = descriptor.alias.as_deref().unwrap_or("<unnamed>"),
                    "load-balancer entry missing url or contextRoots, skipping"
                );
            }
        }
    }

    ingresses
}
