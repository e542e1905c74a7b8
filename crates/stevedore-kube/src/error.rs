//! Error types for stevedore-kube

use thiserror::Error;

/// Result type for Kubernetes operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors that can occur during synthesis, apply, rollout and migration
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// Object is missing metadata.name
    #[error("object has no metadata.name")]
    MissingObjectName,

    /// The create-vs-update lookup failed; existing state is ambiguous, so
    /// this object's apply is aborted
    #[error("lookup of existing {kind} '{name}' failed: {message}")]
    ExistingLookup {
        kind: String,
        name: String,
        message: String,
    },

    /// One object's apply failed
    #[error("failed to apply {kind} '{name}': {message}")]
    Apply {
        kind: String,
        name: String,
        message: String,
    },

    /// One object's delete failed
    #[error("failed to delete {kind} '{name}': {message}")]
    Delete {
        kind: String,
        name: String,
        message: String,
    },

    /// The control plane rejected an update because the version token was
    /// stale; retryable, unlike the other failures
    #[error("version conflict on {kind} '{name}': stale version token")]
    Conflict { kind: String, name: String },

    /// The live workload object does not exist
    #[error("workload '{application}' not found in namespace '{namespace}'")]
    WorkloadNotFound {
        application: String,
        namespace: String,
    },

    /// No pod at the new location became ready within the bounded poll
    #[error(
        "no ready pods for '{application}' after {attempts} attempts, old instance left untouched"
    )]
    ReadinessTimeout { application: String, attempts: u32 },

    /// Manifest resolution failed
    #[error(transparent)]
    Manifest(#[from] stevedore_manifest::ManifestError),

    /// Resource binding failed
    #[error(transparent)]
    Registry(#[from] stevedore_registry::RegistryError),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_yaml::Error> for KubeError {
    fn from(e: serde_yaml::Error) -> Self {
        KubeError::Serialization(e.to_string())
    }
}

impl KubeError {
    /// Check if this is a Kubernetes 404 Not Found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, KubeError::Api(kube::Error::Api(resp)) if resp.code == 404)
    }

    /// Check if this is a version conflict (409)
    pub fn is_conflict(&self) -> bool {
        match self {
            KubeError::Conflict { .. } => true,
            KubeError::Api(kube::Error::Api(resp)) => resp.code == 409,
            _ => false,
        }
    }
}
