//! Provisioner seams: the external collaborators resolution drives.
//!
//! Each trait maps to one platform control-plane surface. Lookup methods
//! take a caller-supplied reference and return the canonical identity;
//! create methods take fully-merged settings and mint a fresh resource.
//! All methods are synchronous; errors are opaque to the resolver and
//! bubble up tagged with the step in flight.
//!
//! Creation should be idempotent on the provisioner side: a retried
//! resolution must not duplicate resources for steps that already
//! succeeded.

use std::collections::BTreeMap;

use anyhow::Result;
use pipewright_types::policy::PolicyDocument;
use pipewright_types::refs::{
    DatabaseRef, JobRef, OutputRef, OutputRefs, PrincipalRef, StreamRef, TableRef,
};
use pipewright_types::schema::FieldDef;

use crate::config::types::DataFormat;

/// Fully-merged creation settings for a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSettings {
    pub name: String,
    pub shard_count: u32,
    pub retention_hours: u32,
    pub encrypt_at_rest: bool,
}

/// Fully-merged creation settings for a catalog database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub name: String,
}

/// Creation request for a catalog table.
///
/// `location` carries the stream the table is wired to
/// (`stream://{name}`); this is the only binding between the catalog
/// entry and the live stream.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRequest {
    pub name: String,
    pub database: DatabaseRef,
    pub data_format: DataFormat,
    pub columns: Vec<FieldDef>,
    pub location: String,
}

/// Fully-merged creation settings for an output store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputStoreSettings {
    pub name: String,
    pub versioned: bool,
    /// Create a secondary store for error records alongside the primary.
    pub error_store: bool,
}

/// Creation request for an ETL job.
///
/// `default_args` already contains the linkage arguments
/// (`--database_name`, `--table_name`, `--output_path`, `--error_path`)
/// merged in last, so the provisioner never re-derives wiring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub name: String,
    pub script_location: String,
    pub engine_version: String,
    pub worker_type: String,
    pub worker_count: u32,
    pub timeout_minutes: u32,
    pub default_args: BTreeMap<String, String>,
}

/// Stream control plane.
pub trait StreamProvisioner {
    /// Confirm an existing stream and return its canonical reference.
    fn lookup_stream(&mut self, existing: &StreamRef) -> Result<StreamRef>;

    /// Create a stream from merged settings.
    fn create_stream(&mut self, settings: &StreamSettings) -> Result<StreamRef>;
}

/// Schema catalog control plane for databases and tables.
pub trait CatalogProvisioner {
    fn lookup_database(&mut self, existing: &DatabaseRef) -> Result<DatabaseRef>;

    fn create_database(&mut self, settings: &DatabaseSettings) -> Result<DatabaseRef>;

    fn lookup_table(&mut self, existing: &TableRef) -> Result<TableRef>;

    fn create_table(&mut self, request: &TableRequest) -> Result<TableRef>;
}

/// Object-store control plane.
pub trait OutputStoreProvisioner {
    /// Confirm an existing store; never yields a secondary.
    fn lookup_output_store(&mut self, existing: &OutputRef) -> Result<OutputRef>;

    /// Create the primary store and, when requested, the error store.
    fn create_output_store(&mut self, settings: &OutputStoreSettings) -> Result<OutputRefs>;
}

/// ETL job control plane.
///
/// Both methods return the job together with its execution identity: an
/// existing job carries an already-attached principal, a fresh job gets a
/// fresh principal minted at creation time.
pub trait JobProvisioner {
    fn lookup_job(&mut self, existing: &JobRef) -> Result<(JobRef, PrincipalRef)>;

    fn create_job(&mut self, request: &JobRequest) -> Result<(JobRef, PrincipalRef)>;
}

/// Attachment surface for derived policy documents.
///
/// The policy builder only produces the artifact; pushing it onto the
/// principal is the caller's call, through this seam.
pub trait PolicyAttachmentSink {
    fn attach(&mut self, principal: &PrincipalRef, policy: &PolicyDocument) -> Result<()>;
}
