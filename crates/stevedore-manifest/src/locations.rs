//! Candidate manifest locations
//!
//! When the deployment request does not name an explicit manifest location,
//! the resolver derives an ordered list of default locations from the
//! application name and version: the artifact-repository URL first, then
//! the two internal-package-repository URL shapes.

/// Base URLs the default manifest locations are derived from.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    /// Artifact repository base URL
    pub artifact_base: String,

    /// Internal package repository base URL
    pub package_base: String,
}

impl ManifestSource {
    pub fn new(artifact_base: impl Into<String>, package_base: impl Into<String>) -> Self {
        Self {
            artifact_base: trim_slash(artifact_base.into()),
            package_base: trim_slash(package_base.into()),
        }
    }

    /// Derived default locations, in the order they are tried.
    pub fn candidate_locations(&self, application: &str, version: &str) -> Vec<String> {
        vec![
            format!(
                "{}/{}/{}/manifest.yaml",
                self.artifact_base, application, version
            ),
            format!(
                "{}/{}/{}/{}-{}.yaml",
                self.package_base, application, version, application, version
            ),
            format!(
                "{}/{}/{}-{}.yaml",
                self.package_base, application, application, version
            ),
        ]
    }
}

fn trim_slash(mut base: String) -> String {
    while base.ends_with('/') {
        base.pop();
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_order() {
        let source = ManifestSource::new(
            "https://artifacts.example.com/manifests",
            "https://packages.example.com/internal",
        );
        let locations = source.candidate_locations("orders", "1.4.2");

        assert_eq!(
            locations,
            vec![
                "https://artifacts.example.com/manifests/orders/1.4.2/manifest.yaml",
                "https://packages.example.com/internal/orders/1.4.2/orders-1.4.2.yaml",
                "https://packages.example.com/internal/orders/orders-1.4.2.yaml",
            ]
        );
    }

    #[test]
    fn test_trailing_slashes_trimmed() {
        let source = ManifestSource::new("https://a.example.com/", "https://p.example.com//");
        let locations = source.candidate_locations("orders", "1");
        assert!(locations[0].starts_with("https://a.example.com/orders/"));
        assert!(locations[1].starts_with("https://p.example.com/orders/"));
    }
}
