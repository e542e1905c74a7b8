//! Error types for registry operations
//!
//! Each failure mode is distinguishable so the caller can report which
//! alias failed and why.

use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors from the resource registry and its follow-up fetches
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// The registry could not be reached at all
    #[error("resource registry unreachable: {message}")]
    Unreachable { message: String },

    /// The registry answered a resource lookup with a non-2xx status
    #[error("registry lookup for '{alias}' failed with status {status}")]
    ResourceLookup { alias: String, status: u16 },

    /// The registry response body does not parse
    #[error("malformed registry response for '{alias}': {message}")]
    MalformedResponse { alias: String, message: String },

    /// The secret referenced by a resource could not be fetched
    #[error("secret fetch for '{alias}' failed: {message}")]
    SecretFetch { alias: String, message: String },

    /// A certificate file referenced by a resource could not be fetched
    #[error("certificate fetch for '{alias}' ({file}) failed: {message}")]
    CertificateFetch {
        alias: String,
        file: String,
        message: String,
    },
}

impl RegistryError {
    pub(crate) fn from_request(err: reqwest::Error) -> Self {
        RegistryError::Unreachable {
            message: err.to_string(),
        }
    }
}
