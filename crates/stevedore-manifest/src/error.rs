//! Error types for manifest resolution

use thiserror::Error;

/// Result type for manifest operations
pub type Result<T> = std::result::Result<T, ManifestError>;

/// One failed fetch attempt, kept for the aggregate error.
#[derive(Debug, Clone)]
pub struct LocationFailure {
    pub location: String,
    pub reason: String,
}

impl std::fmt::Display for LocationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.location, self.reason)
    }
}

/// Errors from fetching and resolving a manifest
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ManifestError {
    /// The location could not be reached at all
    #[error("manifest location unreachable: {location}: {message}")]
    Unreachable { location: String, message: String },

    /// The location answered with a non-2xx status
    #[error("manifest fetch from {location} failed with status {status}")]
    Fetch { location: String, status: u16 },

    /// The response body is not a parseable manifest document
    #[error("manifest from {location} could not be parsed: {message}")]
    Parse { location: String, message: String },

    /// Every candidate location failed; one entry per attempted location,
    /// in the order they were tried
    #[error("no manifest found for '{application}': {}", format_attempts(.attempts))]
    AllLocationsFailed {
        application: String,
        attempts: Vec<LocationFailure>,
    },

    /// Defaulting or validation rejected the fetched manifest
    #[error(transparent)]
    Invalid(#[from] stevedore_core::CoreError),
}

fn format_attempts(attempts: &[LocationFailure]) -> String {
    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ManifestError {
    /// Classify a reqwest error for a given location.
    pub(crate) fn from_request(location: &str, err: reqwest::Error) -> Self {
        ManifestError::Unreachable {
            location: location.to_string(),
            message: err.to_string(),
        }
    }

    /// Short reason string used in the aggregate error.
    pub(crate) fn reason(&self) -> String {
        match self {
            ManifestError::Unreachable { message, .. } => format!("unreachable: {}", message),
            ManifestError::Fetch { status, .. } => format!("status {}", status),
            ManifestError::Parse { message, .. } => format!("parse error: {}", message),
            other => other.to_string(),
        }
    }
}
