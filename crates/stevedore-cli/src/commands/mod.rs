//! Command implementations

pub mod deploy;
pub mod migrate;
pub mod status;
pub mod teardown;

use stevedore_kube::{Deployer, Synthesizer};
use stevedore_manifest::ManifestResolver;

use crate::config::PlatformConfig;
use crate::error::{CliError, Result};

/// Build the deployer all commands share.
pub async fn deployer(config: &PlatformConfig) -> Result<Deployer> {
    let client = kube::Client::try_default()
        .await
        .map_err(|e| CliError::Cluster {
            message: format!("cannot connect to the cluster: {}", e),
        })?;

    Ok(Deployer::new(
        client,
        ManifestResolver::new(config.manifest_source()),
        config.registry_config(),
        Synthesizer::new(config.synthesizer_config()),
    ))
}
