//! Manifest resolver
//!
//! Fetch, default, validate. The manifest is never partially accepted: a
//! fetch failure, an unparseable body or any validation violation rejects
//! the whole document.

use tracing::debug;

use stevedore_core::{ApplicationManifest, CoreError, merge_with_defaults, validate};

use crate::error::{LocationFailure, ManifestError, Result};
use crate::locations::ManifestSource;

/// Resolves application manifests over HTTP.
pub struct ManifestResolver {
    http: reqwest::Client,
    source: ManifestSource,
}

impl ManifestResolver {
    /// Create a resolver for the given manifest source.
    pub fn new(source: ManifestSource) -> Self {
        Self {
            http: reqwest::Client::new(),
            source,
        }
    }

    /// Create with an existing HTTP client.
    pub fn with_client(http: reqwest::Client, source: ManifestSource) -> Self {
        Self { http, source }
    }

    /// Resolve the manifest for one deployment attempt.
    ///
    /// With `location` set only that location is fetched and any failure is
    /// terminal. Otherwise the derived default locations are tried in order
    /// and the aggregate of every failure is returned if none succeeds.
    pub async fn resolve(
        &self,
        application: &str,
        version: &str,
        location: Option<&str>,
    ) -> Result<ApplicationManifest> {
        let raw = match location {
            Some(explicit) => self.fetch(explicit).await?,
            None => self.fetch_first_candidate(application, version).await?,
        };

        let manifest = merge_with_defaults(raw)?;

        let failures = validate(&manifest);
        if !failures.is_empty() {
            return Err(ManifestError::Invalid(CoreError::Validation { failures }));
        }

        Ok(manifest)
    }

    /// Try the derived locations in order; stop at the first parseable 2xx.
    async fn fetch_first_candidate(
        &self,
        application: &str,
        version: &str,
    ) -> Result<serde_json::Value> {
        let mut attempts = Vec::new();

        for location in self.source.candidate_locations(application, version) {
            match self.fetch(&location).await {
                Ok(value) => {
                    debug!(%location, application, "resolved manifest");
                    return Ok(value);
                }
                Err(err) => {
                    debug!(%location, reason = %err.reason(), "manifest location failed");
                    attempts.push(LocationFailure {
                        location,
                        reason: err.reason(),
                    });
                }
            }
        }

        Err(ManifestError::AllLocationsFailed {
            application: application.to_string(),
            attempts,
        })
    }

    /// Fetch and parse a single location.
    async fn fetch(&self, location: &str) -> Result<serde_json::Value> {
        let response = self
            .http
            .get(location)
            .send()
            .await
            .map_err(|e| ManifestError::from_request(location, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ManifestError::Fetch {
                location: location.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ManifestError::from_request(location, e))?;

        serde_yaml::from_str(&body).map_err(|e| ManifestError::Parse {
            location: location.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MANIFEST_YAML: &str = "image: registry.example.com/orders\nport: 9000\n";

    fn source_for(server: &MockServer) -> ManifestSource {
        ManifestSource::new(
            format!("{}/artifacts", server.uri()),
            format!("{}/packages", server.uri()),
        )
    }

    #[tokio::test]
    async fn test_explicit_location_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/custom/orders.yaml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MANIFEST_YAML))
            .mount(&server)
            .await;

        let resolver = ManifestResolver::new(source_for(&server));
        let manifest = resolver
            .resolve(
                "orders",
                "1.4.2",
                Some(&format!("{}/custom/orders.yaml", server.uri())),
            )
            .await
            .unwrap();

        assert_eq!(manifest.image, "registry.example.com/orders");
        assert_eq!(manifest.port, 9000);
        // Defaults filled in around the fetched fields
        assert_eq!(manifest.replicas.min, 2);
        assert_eq!(manifest.healthcheck.liveness.path, "/isalive");
    }

    #[tokio::test]
    async fn test_explicit_location_failure_is_terminal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/custom/orders.yaml"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        // The default locations would succeed, but must not be consulted
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MANIFEST_YAML))
            .mount(&server)
            .await;

        let resolver = ManifestResolver::new(source_for(&server));
        let err = resolver
            .resolve(
                "orders",
                "1.4.2",
                Some(&format!("{}/custom/orders.yaml", server.uri())),
            )
            .await
            .unwrap_err();

        match err {
            ManifestError::Fetch { status, .. } => assert_eq!(status, 404),
            other => panic!("expected Fetch error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fallback_stops_at_first_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/artifacts/orders/1.4.2/manifest.yaml"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/packages/orders/1.4.2/orders-1.4.2.yaml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MANIFEST_YAML))
            .mount(&server)
            .await;

        let resolver = ManifestResolver::new(source_for(&server));
        let manifest = resolver.resolve("orders", "1.4.2", None).await.unwrap();

        assert_eq!(manifest.port, 9000);
    }

    #[tokio::test]
    async fn test_all_locations_failed_aggregates_every_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let resolver = ManifestResolver::new(source_for(&server));
        let err = resolver.resolve("orders", "1.4.2", None).await.unwrap_err();

        match err {
            ManifestError::AllLocationsFailed {
                application,
                attempts,
            } => {
                assert_eq!(application, "orders");
                assert_eq!(attempts.len(), 3);
                assert!(attempts.iter().all(|a| a.reason.contains("404")));
            }
            other => panic!("expected AllLocationsFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unparseable_body_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/custom/orders.yaml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(": not: valid: yaml: {{"))
            .mount(&server)
            .await;

        let resolver = ManifestResolver::new(source_for(&server));
        let err = resolver
            .resolve(
                "orders",
                "1.4.2",
                Some(&format!("{}/custom/orders.yaml", server.uri())),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_invalid_manifest_reports_all_violations() {
        let server = MockServer::start().await;
        let bad = "image: example.com/orders:1.2\nreplicas:\n  min: 5\n  max: 2\n";
        Mock::given(method("GET"))
            .and(path("/custom/orders.yaml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(bad))
            .mount(&server)
            .await;

        let resolver = ManifestResolver::new(source_for(&server));
        let err = resolver
            .resolve(
                "orders",
                "1.4.2",
                Some(&format!("{}/custom/orders.yaml", server.uri())),
            )
            .await
            .unwrap_err();

        match err {
            ManifestError::Invalid(CoreError::Validation { failures }) => {
                let rules: Vec<&str> = failures.iter().map(|f| f.rule).collect();
                assert!(rules.contains(&"imageHasNoTag"));
                assert!(rules.contains(&"replicasBounds"));
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }
}
