//! Platform configuration
//!
//! One YAML file describes the platform a deployment targets: the resource
//! registry, the manifest sources and the synthesizer add-ons. Everything
//! the engine needs is threaded in explicitly from here; nothing reads
//! process environment at call time.

use serde::{Deserialize, Serialize};
use std::path::Path;

use stevedore_kube::{SecretInjectionConfig, SynthesizerConfig};
use stevedore_manifest::ManifestSource;
use stevedore_registry::RegistryConfig;

use crate::error::{CliError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    /// Resource registry base URL
    pub registry_url: String,

    /// Artifact repository base URL for manifests
    pub artifact_repository: String,

    /// Internal package repository base URL for manifests
    pub package_repository: String,

    #[serde(default)]
    pub ingress_domain: Option<String>,

    #[serde(default)]
    pub cluster_domain: Option<String>,

    /// Enable the autoscaler add-on
    #[serde(default)]
    pub autoscaling: bool,

    #[serde(default)]
    pub elector_image: Option<String>,

    #[serde(default)]
    pub cache_image: Option<String>,

    #[serde(default)]
    pub alerts_config_map: Option<String>,

    /// Secret-injection add-on wiring; absent means off
    #[serde(default)]
    pub secret_injection: Option<SecretInjectionSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretInjectionSettings {
    pub image: String,
    pub address: String,
}

impl PlatformConfig {
    /// Load from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(
                format!("cannot read {}: {}", path.display(), e),
                "pass --config or set STEVEDORE_CONFIG",
            )
        })?;
        serde_yaml::from_str(&content).map_err(|e| {
            CliError::config(
                format!("cannot parse {}: {}", path.display(), e),
                "see the documented platform config format",
            )
        })
    }

    pub fn manifest_source(&self) -> ManifestSource {
        ManifestSource::new(&self.artifact_repository, &self.package_repository)
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig::new(&self.registry_url)
    }

    pub fn synthesizer_config(&self) -> SynthesizerConfig {
        let defaults = SynthesizerConfig::default();
        SynthesizerConfig {
            cluster_domain: self
                .cluster_domain
                .clone()
                .unwrap_or(defaults.cluster_domain),
            ingress_domain: self
                .ingress_domain
                .clone()
                .unwrap_or(defaults.ingress_domain),
            autoscaling: self.autoscaling,
            elector_image: self.elector_image.clone().unwrap_or(defaults.elector_image),
            cache_image: self.cache_image.clone().unwrap_or(defaults.cache_image),
            alerts_config_map: self
                .alerts_config_map
                .clone()
                .unwrap_or(defaults.alerts_config_map),
            secret_injection: self.secret_injection.as_ref().map(|s| {
                SecretInjectionConfig {
                    image: s.image.clone(),
                    address: s.address.clone(),
                }
            }),
        }
    }
}
