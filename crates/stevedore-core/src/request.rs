//! Deployment request - identifies one deployment attempt

/// Credentials for the external resource registry.
#[derive(Debug, Clone, Default)]
pub struct RegistryCredentials {
    pub username: String,
    pub password: String,
}

impl RegistryCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// One deployment attempt.
///
/// Constructed per incoming deploy call and never mutated afterwards; the
/// whole flow (manifest resolution, resource binding, synthesis, apply)
/// reads from the same request value.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    /// Application name; also the name of every synthesized object
    pub application: String,

    /// Version / image tag to deploy
    pub version: String,

    /// Target namespace
    pub namespace: String,

    /// Network zone constraining which resources the application may bind
    pub zone: String,

    /// Resource-registry environment name
    pub environment: String,

    /// Resource-registry credentials
    pub credentials: RegistryCredentials,

    /// Explicit manifest location; when set, no fallback locations are tried
    pub manifest_location: Option<String>,

    /// Skip external resource binding entirely
    pub skip_resource_binding: bool,
}

impl DeployRequest {
    /// Create a request with the mandatory coordinates
    pub fn new(
        application: impl Into<String>,
        version: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            application: application.into(),
            version: version.into(),
            namespace: namespace.into(),
            zone: String::new(),
            environment: String::new(),
            credentials: RegistryCredentials::default(),
            manifest_location: None,
            skip_resource_binding: false,
        }
    }

    /// Set the network zone
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = zone.into();
        self
    }

    /// Set the registry environment and credentials
    pub fn with_registry(
        mut self,
        environment: impl Into<String>,
        credentials: RegistryCredentials,
    ) -> Self {
        self.environment = environment.into();
        self.credentials = credentials;
        self
    }

    /// Override the manifest location
    pub fn with_manifest_location(mut self, location: impl Into<String>) -> Self {
        self.manifest_location = Some(location.into());
        self
    }

    /// Skip external resource binding
    pub fn skip_resource_binding(mut self) -> Self {
        self.skip_resource_binding = true;
        self
    }
}
