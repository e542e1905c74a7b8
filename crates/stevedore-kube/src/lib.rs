//! Stevedore Kube - Kubernetes integration for the deployment engine
//!
//! This crate provides:
//! - **Object Synthesis**: Turn {request, manifest, resources} into the full
//!   typed object set an application needs
//! - **Reconciling Apply**: Lookup-then-create-or-update per object kind,
//!   carrying the control plane's version token into every update
//! - **Rollout Status**: Classify rollout progress from the live workload
//! - **Migration/Teardown**: Redirect an old-location service and
//!   decommission the old object set, best-effort per kind
//! - **Deployer**: The facade chaining resolve, bind, synthesize and apply

pub mod apply;
pub mod deploy;
pub mod error;
pub mod migrate;
pub mod rollout;
pub mod store;
pub mod synthesis;

pub use apply::{Applier, AppliedKind, ApplyReport, DeleteOutcome, FailedKind, Operation};
pub use deploy::{DeployOutcome, Deployer};
pub use error::{KubeError, Result};
pub use migrate::{
    ClusterPodLister, KindOutcome, MigrationConfig, MigrationOutcome, Migrator, PodLister,
    StaticPodLister, teardown,
};
pub use rollout::{ContainerImage, RolloutStatus, RolloutView, evaluate};
pub use store::{
    ClusterStore, ControlPlane, MemoryControlPlane, MemoryStore, ObjectStore, OperationCounts,
};
pub use synthesis::{
    AlertEntry, SecretInjectionConfig, Synthesizer, SynthesizerConfig, TargetObjectSet,
};
