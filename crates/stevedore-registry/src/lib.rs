//! Stevedore Registry - external resource binding
//!
//! Given the manifest's list of used external resources, queries the
//! resource registry, resolves secrets and certificates and produces the
//! uniform in-memory resource view the synthesizer consumes.
//!
//! Binding is all-or-nothing: any hard failure for any alias aborts the
//! whole operation so a deployment never starts with partially bound
//! resources. The one exception is the load-balancer/ingress lookup, which
//! is best-effort by design: its failures are logged and never abort a
//! deployment.

pub mod binder;
pub mod client;
pub mod descriptor;
pub mod error;
pub mod resolved;

pub use binder::{BindingScope, ResourceBinder};
pub use client::{RegistryClient, RegistryConfig};
pub use descriptor::{FileRef, ResourceDescriptor, SecretRef};
pub use error::{RegistryError, Result};
pub use resolved::ResolvedResource;

/// Resource type whose properties explode into individual properties.
pub const KIND_APPLICATION_PROPERTIES: &str = "applicationproperties";

/// Resource type carrying keystore files.
pub const KIND_CERTIFICATE: &str = "certificate";

/// Resource type holding ingress host/context-root pairs.
pub const KIND_LOAD_BALANCER_CONFIG: &str = "loadbalancerconfig";
