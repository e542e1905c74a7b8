//! Error types for stevedore-core

use thiserror::Error;

use crate::validation::ValidationFailure;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors from manifest handling and validation
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoreError {
    /// The merged manifest does not deserialize into the typed model
    #[error("manifest does not match the expected shape: {message}")]
    ManifestShape { message: String },

    /// A resource quantity does not match the strict grammar
    #[error("invalid quantity '{quantity}'")]
    InvalidQuantity { quantity: String },

    /// The manifest violates one or more validation rules; all violations
    /// are carried, never just the first
    #[error("manifest validation failed: {}", format_failures(.failures))]
    Validation { failures: Vec<ValidationFailure> },
}

fn format_failures(failures: &[ValidationFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_validation_error_lists_every_failure() {
        let err = CoreError::Validation {
            failures: vec![
                ValidationFailure {
                    rule: "replicasBounds",
                    message: "replicas.min must not exceed replicas.max".to_string(),
                    fields: BTreeMap::new(),
                },
                ValidationFailure {
                    rule: "cpuThresholdRange",
                    message: "replicas.cpuThresholdPercentage must be between 10 and 90"
                        .to_string(),
                    fields: BTreeMap::new(),
                },
            ],
        };

        let rendered = err.to_string();
        assert!(rendered.contains("replicasBounds"));
        assert!(rendered.contains("cpuThresholdRange"));
    }
}
