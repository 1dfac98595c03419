//! Validated configuration bundle.
//!
//! The raw YAML model can say contradictory things (both `existing` and
//! `create` for one resource). After validation each resource is a tagged
//! union with exactly one active channel, so downstream code cannot observe
//! an ambiguous specification.

use std::fmt;

use pipewright_types::platform::PlatformContext;
use pipewright_types::refs::{DatabaseRef, JobRef, OutputRef, StreamRef, TableRef};
use pipewright_types::schema::FieldDef;

use crate::config::types::{DatabaseProps, JobProps, OutputStoreProps, StreamProps, TableProps};

/// How one resource is specified: reuse, create with overrides, or create
/// from built-in defaults.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceSpec<R, P> {
    Existing(R),
    Create(P),
    Default,
}

impl<R, P> Default for ResourceSpec<R, P> {
    fn default() -> Self {
        Self::Default
    }
}

/// Job specification; a job has no default channel.
#[derive(Debug, Clone, PartialEq)]
pub enum JobSpec {
    Existing(JobRef),
    Create(JobProps),
}

/// The single schema source left active after precedence resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaSource {
    /// Reuse a table already registered in the catalog.
    ExistingTable(TableRef),
    /// Create a fresh table from the given definition.
    Create(TableSchema),
}

/// Creation-side schema definition for a fresh table.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSchema {
    /// Table creation properties, which may carry their own column list.
    Props(TableProps),
    /// Bare ordered field list; table settings fall back to defaults.
    Fields(Vec<FieldDef>),
}

impl SchemaSource {
    pub fn kind(&self) -> SchemaSourceKind {
        match self {
            Self::ExistingTable(_) => SchemaSourceKind::ExistingTable,
            Self::Create(TableSchema::Props(_)) => SchemaSourceKind::TableProps,
            Self::Create(TableSchema::Fields(_)) => SchemaSourceKind::FieldSchema,
        }
    }
}

/// Label for one leg of the schema precedence triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaSourceKind {
    ExistingTable,
    TableProps,
    FieldSchema,
}

impl fmt::Display for SchemaSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ExistingTable => "existing_table",
            Self::TableProps => "table_props",
            Self::FieldSchema => "field_schema",
        };
        f.write_str(s)
    }
}

/// Resolved schema triple: the active source plus any lower-precedence
/// sources that were supplied and shadowed by it.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaSpec {
    pub source: SchemaSource,
    pub shadowed: Vec<SchemaSourceKind>,
}

/// Supported output sink kinds. Open for future variants; unknown kinds
/// fail validation rather than silently no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OutputStoreKind {
    ObjectStore,
}

impl OutputStoreKind {
    /// Parse the raw `kind` string; `None` means the kind is unsupported.
    #[must_use]
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "object_store" => Some(Self::ObjectStore),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ObjectStore => "object_store",
        }
    }
}

impl fmt::Display for OutputStoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated output store specification.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputStoreSpec {
    pub kind: OutputStoreKind,
    pub channel: ResourceSpec<OutputRef, OutputStoreProps>,
}

/// Everything the resolver needs, with all validation rules already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationBundle {
    pub pipeline: String,
    pub platform: PlatformContext,
    pub stream: ResourceSpec<StreamRef, StreamProps>,
    pub database: ResourceSpec<DatabaseRef, DatabaseProps>,
    pub schema: SchemaSpec,
    pub job: JobSpec,
    pub output_store: OutputStoreSpec,
}
