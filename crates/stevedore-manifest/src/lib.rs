//! Stevedore Manifest Resolution
//!
//! Fetches the raw application manifest from one of several candidate
//! locations, merges in the built-in defaults and runs the validation rule
//! set. With an explicit location only that location is tried and any
//! failure is terminal; otherwise the derived default locations are tried
//! in order and every failure along the way is aggregated into a single
//! structured error if all of them fail.

pub mod error;
pub mod locations;
pub mod resolver;

pub use error::{LocationFailure, ManifestError, Result};
pub use locations::ManifestSource;
pub use resolver::ManifestResolver;
