//! Stevedore Core - Core types for the deployment reconciliation engine
//!
//! This crate provides the foundational types used throughout Stevedore:
//! - `DeployRequest`: One deployment attempt, immutable once constructed
//! - `ApplicationManifest`: The per-application desired-state document
//! - Defaulting: non-destructive merge of the built-in default manifest
//! - Validation: the full rule set, evaluated collect-all (never fail-fast)

pub mod defaults;
pub mod error;
pub mod manifest;
pub mod quantity;
pub mod request;
pub mod validation;

pub use defaults::{default_manifest_value, merge_with_defaults};
pub use error::{CoreError, Result};
pub use manifest::{
    AlertRule, ApplicationManifest, ExposedResource, Healthcheck, Probe, Replicas,
    ResourceLimits, ResourceRequirements, UsedResource,
};
pub use quantity::parse_quantity;
pub use request::{DeployRequest, RegistryCredentials};
pub use validation::{ValidationFailure, validate};
