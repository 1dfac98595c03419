//! Built-in defaults, derived resource names, and the override merge.
//!
//! Merge policy is field-by-field: an override wins for exactly the fields
//! it sets, defaults fill the rest. Whole-object replacement never happens.
//! Every derived name is seeded from the pipeline name so repeated
//! resolutions of the same config mint the same identities.

use std::collections::BTreeMap;

use pipewright_types::policy::TELEMETRY_NAMESPACE;
use pipewright_types::refs::{DatabaseRef, OutputRefs, StreamRef, TableRef};

use crate::config::bundle::TableSchema;
use crate::config::types::{DataFormat, DatabaseProps, JobProps, OutputStoreProps, StreamProps};
use crate::provision::{
    DatabaseSettings, JobRequest, OutputStoreSettings, StreamSettings, TableRequest,
};

pub const DEFAULT_SHARD_COUNT: u32 = 1;
pub const DEFAULT_RETENTION_HOURS: u32 = 24;
const DEFAULT_ENCRYPT_AT_REST: bool = true;
const DEFAULT_ENGINE_VERSION: &str = "2.0";
const DEFAULT_WORKER_TYPE: &str = "standard";
const DEFAULT_WORKER_COUNT: u32 = 2;
const DEFAULT_TIMEOUT_MINUTES: u32 = 60;
const DEFAULT_VERSIONED: bool = true;
const DEFAULT_ERROR_STORE: bool = true;

/// Job arguments carrying the resolved wiring into the job runtime.
pub const ARG_DATABASE_NAME: &str = "--database_name";
pub const ARG_TABLE_NAME: &str = "--table_name";
pub const ARG_OUTPUT_PATH: &str = "--output_path";
pub const ARG_ERROR_PATH: &str = "--error_path";
pub const ARG_TELEMETRY_NAMESPACE: &str = "--telemetry_namespace";

pub fn stream_name(pipeline: &str) -> String {
    format!("{pipeline}-stream")
}

pub fn database_name(pipeline: &str) -> String {
    format!("{pipeline}_database")
}

pub fn table_name(pipeline: &str) -> String {
    format!("{pipeline}_table")
}

pub fn job_name(pipeline: &str) -> String {
    format!("{pipeline}-etl")
}

pub fn output_store_name(pipeline: &str) -> String {
    format!("{pipeline}-output")
}

/// Name of the secondary error-records store next to a primary store.
pub fn error_store_name(primary: &str) -> String {
    format!("{primary}-errors")
}

/// Name of the execution identity minted alongside a fresh job.
pub fn principal_name(job: &str) -> String {
    format!("{job}-role")
}

/// Storage location wiring a catalog table to its source stream.
pub fn stream_location(stream_name: &str) -> String {
    format!("stream://{stream_name}")
}

pub fn stream_settings(pipeline: &str, props: Option<&StreamProps>) -> StreamSettings {
    StreamSettings {
        name: props
            .and_then(|p| p.name.clone())
            .unwrap_or_else(|| stream_name(pipeline)),
        shard_count: props
            .and_then(|p| p.shard_count)
            .unwrap_or(DEFAULT_SHARD_COUNT),
        retention_hours: props
            .and_then(|p| p.retention_hours)
            .unwrap_or(DEFAULT_RETENTION_HOURS),
        encrypt_at_rest: props
            .and_then(|p| p.encrypt_at_rest)
            .unwrap_or(DEFAULT_ENCRYPT_AT_REST),
    }
}

pub fn database_settings(pipeline: &str, props: Option<&DatabaseProps>) -> DatabaseSettings {
    DatabaseSettings {
        name: props
            .and_then(|p| p.name.clone())
            .unwrap_or_else(|| database_name(pipeline)),
    }
}

/// Build the table creation request for the active schema definition.
///
/// The resolved stream is embedded as the table's storage location; this is
/// how the catalog entry points at the live stream.
pub fn table_request(
    pipeline: &str,
    schema: &TableSchema,
    database: &DatabaseRef,
    stream: &StreamRef,
) -> TableRequest {
    let location = stream_location(&stream.name);
    match schema {
        TableSchema::Props(props) => TableRequest {
            name: props.name.clone().unwrap_or_else(|| table_name(pipeline)),
            database: database.clone(),
            data_format: props.data_format.unwrap_or_default(),
            columns: props.columns.clone().unwrap_or_default(),
            location,
        },
        TableSchema::Fields(fields) => TableRequest {
            name: table_name(pipeline),
            database: database.clone(),
            data_format: DataFormat::default(),
            columns: fields.clone(),
            location,
        },
    }
}

pub fn output_store_settings(
    pipeline: &str,
    props: Option<&OutputStoreProps>,
) -> OutputStoreSettings {
    OutputStoreSettings {
        name: props
            .and_then(|p| p.name.clone())
            .unwrap_or_else(|| output_store_name(pipeline)),
        versioned: props.and_then(|p| p.versioned).unwrap_or(DEFAULT_VERSIONED),
        error_store: props
            .and_then(|p| p.error_store)
            .unwrap_or(DEFAULT_ERROR_STORE),
    }
}

/// Build the job creation request, wiring in the resolved resources.
///
/// Linkage arguments are inserted after the caller's `default_args`, so the
/// resolved wiring wins over any hand-written value for the same key.
pub fn job_request(
    pipeline: &str,
    props: &JobProps,
    database: &DatabaseRef,
    table: &TableRef,
    output: &OutputRefs,
) -> JobRequest {
    let mut default_args = base_job_args();
    default_args.extend(props.default_args.clone());
    default_args.insert(ARG_DATABASE_NAME.to_string(), database.name.clone());
    default_args.insert(ARG_TABLE_NAME.to_string(), table.name.clone());
    default_args.insert(ARG_OUTPUT_PATH.to_string(), output.primary.uri.clone());
    if let Some(secondary) = &output.secondary {
        default_args.insert(ARG_ERROR_PATH.to_string(), secondary.uri.clone());
    }

    JobRequest {
        name: props.name.clone().unwrap_or_else(|| job_name(pipeline)),
        script_location: props.script_location.clone(),
        engine_version: props
            .engine_version
            .clone()
            .unwrap_or_else(|| DEFAULT_ENGINE_VERSION.to_string()),
        worker_type: props
            .worker_type
            .clone()
            .unwrap_or_else(|| DEFAULT_WORKER_TYPE.to_string()),
        worker_count: props.worker_count.unwrap_or(DEFAULT_WORKER_COUNT),
        timeout_minutes: props.timeout_minutes.unwrap_or(DEFAULT_TIMEOUT_MINUTES),
        default_args,
    }
}

fn base_job_args() -> BTreeMap<String, String> {
    BTreeMap::from([(
        ARG_TELEMETRY_NAMESPACE.to_string(),
        TELEMETRY_NAMESPACE.to_string(),
    )])
}
