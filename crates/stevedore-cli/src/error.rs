//! CLI error types with exit code handling

use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that maps errors to exit codes
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Manifest validation failed
    #[error("validation failed: {message}")]
    #[diagnostic(code(stevedore::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Manifest could not be resolved
    #[error("manifest resolution failed: {message}")]
    #[diagnostic(code(stevedore::cli::manifest))]
    Manifest { message: String },

    /// Resource binding failed
    #[error("resource binding failed: {message}")]
    #[diagnostic(code(stevedore::cli::registry))]
    Registry { message: String },

    /// Cluster operation failed
    #[error("cluster operation failed: {message}")]
    #[diagnostic(code(stevedore::cli::cluster))]
    Cluster { message: String },

    /// Platform configuration problem
    #[error("configuration error: {message}")]
    #[diagnostic(code(stevedore::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error
    #[error("IO error: {message}")]
    #[diagnostic(code(stevedore::cli::io))]
    Io { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            _ => exit_codes::ERROR,
        }
    }

    pub fn config(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<stevedore_kube::KubeError> for CliError {
    fn from(err: stevedore_kube::KubeError) -> Self {
        use stevedore_kube::KubeError;
        use stevedore_manifest::ManifestError;

        match err {
            KubeError::Manifest(ManifestError::Invalid(core)) => CliError::Validation {
                message: core.to_string(),
                help: Some("fix the manifest and redeploy; every violation is listed".to_string()),
            },
            KubeError::Manifest(e) => CliError::Manifest {
                message: e.to_string(),
            },
            KubeError::Registry(e) => CliError::Registry {
                message: e.to_string(),
            },
            other => CliError::Cluster {
                message: other.to_string(),
            },
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
