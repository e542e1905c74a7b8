//! HTTP client for the resource-registry protocol
//!
//! Resource lookups and secret fetches are basic-authenticated with the
//! credentials from the deployment request; certificate downloads are
//! unauthenticated raw-byte fetches.

use stevedore_core::RegistryCredentials;

use crate::descriptor::{FileRef, ResourceDescriptor};
use crate::error::{RegistryError, Result};
use crate::KIND_LOAD_BALANCER_CONFIG;

/// Registry endpoint configuration.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Registry base URL
    pub base_url: String,
}

impl RegistryConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    fn resources_url(&self) -> String {
        format!("{}/api/v2/resources", self.base_url)
    }
}

/// Authenticated client for one deployment attempt.
pub struct RegistryClient {
    http: reqwest::Client,
    config: RegistryConfig,
    credentials: RegistryCredentials,
}

impl RegistryClient {
    pub fn new(config: RegistryConfig, credentials: RegistryCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            credentials,
        }
    }

    pub fn with_client(
        http: reqwest::Client,
        config: RegistryConfig,
        credentials: RegistryCredentials,
    ) -> Self {
        Self {
            http,
            config,
            credentials,
        }
    }

    /// Look up one resource by alias and type within an environment/zone.
    pub async fn lookup_resource(
        &self,
        alias: &str,
        kind: &str,
        environment: &str,
        application: &str,
        zone: &str,
    ) -> Result<ResourceDescriptor> {
        let response = self
            .http
            .get(self.config.resources_url())
            .query(&[
                ("alias", alias),
                ("type", kind),
                ("environment", environment),
                ("application", application),
                ("zone", zone),
            ])
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await
            .map_err(RegistryError::from_request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::ResourceLookup {
                alias: alias.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<ResourceDescriptor>()
            .await
            .map_err(|e| RegistryError::MalformedResponse {
                alias: alias.to_string(),
                message: e.to_string(),
            })
    }

    /// Look up the load-balancer configuration for an application.
    ///
    /// Callers treat this lookup as best-effort; the error is still typed
    /// so they can log what went wrong.
    pub async fn lookup_load_balancer(
        &self,
        environment: &str,
        application: &str,
    ) -> Result<Vec<ResourceDescriptor>> {
        let response = self
            .http
            .get(self.config.resources_url())
            .query(&[
                ("type", KIND_LOAD_BALANCER_CONFIG),
                ("environment", environment),
                ("application", application),
            ])
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await
            .map_err(RegistryError::from_request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::ResourceLookup {
                alias: KIND_LOAD_BALANCER_CONFIG.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<Vec<ResourceDescriptor>>()
            .await
            .map_err(|e| RegistryError::MalformedResponse {
                alias: KIND_LOAD_BALANCER_CONFIG.to_string(),
                message: e.to_string(),
            })
    }

    /// Fetch a secret value; the raw response body is the secret.
    pub async fn fetch_secret(&self, alias: &str, url: &str) -> Result<String> {
        let response = self
            .http
            .get(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await
            .map_err(|e| RegistryError::SecretFetch {
                alias: alias.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::SecretFetch {
                alias: alias.to_string(),
                message: format!("status {}", status.as_u16()),
            });
        }

        response
            .text()
            .await
            .map_err(|e| RegistryError::SecretFetch {
                alias: alias.to_string(),
                message: e.to_string(),
            })
    }

    /// Fetch a certificate file; the raw bytes are the content.
    pub async fn fetch_file(&self, alias: &str, file: &FileRef) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(&file.fileurl)
            .send()
            .await
            .map_err(|e| RegistryError::CertificateFetch {
                alias: alias.to_string(),
                file: file.filename.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::CertificateFetch {
                alias: alias.to_string(),
                file: file.filename.clone(),
                message: format!("status {}", status.as_u16()),
            });
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| RegistryError::CertificateFetch {
                alias: alias.to_string(),
                file: file.filename.clone(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trimmed() {
        let config = RegistryConfig::new("https://registry.example.com/");
        assert_eq!(
            config.resources_url(),
            "https://registry.example.com/api/v2/resources"
        );
    }
}
