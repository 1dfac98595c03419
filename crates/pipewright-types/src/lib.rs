//! Shared pipewright data model.
//!
//! This crate is the dependency boundary between the resolution engine and
//! anything that implements a provisioner: resource references, platform
//! addressing, schema sources, the policy document, and the configuration
//! error taxonomy.

pub mod error;
pub mod platform;
pub mod policy;
pub mod refs;
pub mod schema;
