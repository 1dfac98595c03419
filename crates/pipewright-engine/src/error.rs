//! Resolution error model.

use std::fmt;

use pipewright_types::error::ConfigError;

/// Resolution steps, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStep {
    Stream,
    Database,
    Table,
    OutputStore,
    Job,
}

impl fmt::Display for ResolveStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Stream => "stream",
            Self::Database => "database",
            Self::Table => "table",
            Self::OutputStore => "output_store",
            Self::Job => "job",
        };
        f.write_str(s)
    }
}

/// Why a resolution attempt failed.
///
/// `Config` is a semantic violation of the input, raised before any
/// provisioner is touched; the caller must fix the config.
///
/// `Provisioner` wraps an opaque collaborator failure, tagged with the step
/// that was in flight. Steps completed before the failing one have side
/// effects the caller is responsible for reconciling; no rollback happens
/// here.
#[derive(Debug)]
pub enum ResolveError {
    /// Input violated a validation rule; no provisioner was called.
    Config(ConfigError),
    /// A provisioner call failed mid-resolution.
    Provisioner {
        step: ResolveStep,
        source: anyhow::Error,
    },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{e}"),
            Self::Provisioner { step, source } => {
                write!(f, "{step} provisioning failed: {source}")
            }
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<ConfigError> for ResolveError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl ResolveError {
    /// Returns the config violation if this failure happened before any
    /// provisioner call.
    pub fn as_config_error(&self) -> Option<&ConfigError> {
        match self {
            Self::Config(e) => Some(e),
            Self::Provisioner { .. } => None,
        }
    }

    /// Returns the step that was in flight for a provisioner failure.
    pub fn step(&self) -> Option<ResolveStep> {
        match self {
            Self::Config(_) => None,
            Self::Provisioner { step, .. } => Some(*step),
        }
    }
}
