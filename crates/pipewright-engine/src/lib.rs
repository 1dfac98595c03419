//! Resolution and policy-derivation core for pipewright pipelines.
//!
//! Turns a pipeline configuration into a fully-wired [`PipelineDescriptor`]
//! by driving a set of provisioner traits in dependency order, then derives
//! the least-privilege policy the job principal needs to run.

pub mod alarms;
pub mod config;
pub mod defaults;
pub mod error;
pub mod plan;
pub mod policy;
pub mod provision;
pub mod resolver;

// Re-export public API for convenience
pub use error::{ResolveError, ResolveStep};
pub use plan::{PlanProvisioner, PlannedAction, PlannedOp};
pub use policy::PolicyBuilder;
pub use resolver::{resolve, Provisioners};

pub use pipewright_types::refs::PipelineDescriptor;
