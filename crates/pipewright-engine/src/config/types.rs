//! Raw pipeline configuration as written in the YAML file.
//!
//! Every resource section is an `existing`/`create` pair. The raw model can
//! physically express both channels at once; the validator decides what that
//! means per resource and produces the typed
//! [`ConfigurationBundle`](crate::config::bundle::ConfigurationBundle).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use pipewright_types::platform::PlatformContext;
use pipewright_types::schema::FieldDef;

/// Top-level pipeline configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Config format version; only "1.0" is accepted.
    #[serde(default = "default_version")]
    pub version: String,
    /// Pipeline name; derived resource names are seeded from it.
    pub pipeline: String,
    /// Partition/region/account override for ARN construction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<PlatformContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<ResourceSection<StreamProps>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<ResourceSection<DatabaseProps>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<ResourceSection<TableProps>>,
    /// Explicit field list; the lowest-precedence schema source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Vec<FieldDef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<ResourceSection<JobProps>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_store: Option<OutputStoreSection>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl PipelineConfig {
    /// Platform context for ARN construction, falling back to local defaults.
    #[must_use]
    pub fn platform_context(&self) -> PlatformContext {
        self.platform.clone().unwrap_or_default()
    }
}

/// One `existing`/`create` pair as written in the file.
///
/// Both fields are physically optional here so the validator can report a
/// double-specification instead of failing at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "P: Deserialize<'de>"))]
pub struct ResourceSection<P> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing: Option<ExistingResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<P>,
}

impl<P> Default for ResourceSection<P> {
    fn default() -> Self {
        Self {
            existing: None,
            create: None,
        }
    }
}

/// Caller-supplied reference to a resource that already exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingResource {
    pub name: String,
    pub arn: String,
}

/// Creation overrides for a fresh stream; unset fields fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_hours: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypt_at_rest: Option<bool>,
}

/// Creation overrides for a fresh catalog database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Creation overrides for a fresh catalog table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_format: Option<DataFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<FieldDef>>,
}

/// Serialization format recorded on a created table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFormat {
    #[default]
    Json,
    Parquet,
    Avro,
    Csv,
}

impl DataFormat {
    pub fn catalog_name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Parquet => "parquet",
            Self::Avro => "avro",
            Self::Csv => "csv",
        }
    }
}

/// Creation overrides for a fresh ETL job.
///
/// `script_location` has no default; a job cannot be created without one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub script_location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_minutes: Option<u32>,
    /// Free-form job arguments merged over built-in defaults.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_args: BTreeMap<String, String>,
}

/// Output store section; carries the sink kind next to the channel pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputStoreSection {
    /// Sink kind; only `object_store` is implemented.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing: Option<ExistingOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<OutputStoreProps>,
}

/// Caller-supplied reference to an output store that already exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingOutput {
    pub name: String,
    pub arn: String,
    /// Write-target URI; derived as `store://{name}` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Creation overrides for a fresh output store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputStoreProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versioned: Option<bool>,
    /// Whether a secondary store for error records is created alongside.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_store: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_parses() {
        let yaml = r#"
pipeline: clickstream
schema:
  - name: ts
    type: timestamp
job:
  create:
    script_location: store://scripts/etl.py
"#;
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.pipeline, "clickstream");
        assert!(config.stream.is_none());
        assert_eq!(config.schema.as_ref().map(Vec::len), Some(1));
        let job = config.job.unwrap();
        assert!(job.existing.is_none());
        assert_eq!(
            job.create.unwrap().script_location,
            "store://scripts/etl.py"
        );
    }

    #[test]
    fn platform_section_fills_missing_fields() {
        let yaml = r#"
pipeline: clickstream
platform:
  region: us-east-1
job:
  existing:
    name: legacy-etl
    arn: arn:cloud:jobs:us-east-1:123:job/legacy-etl
"#;
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        let ctx = config.platform_context();
        assert_eq!(ctx.region, "us-east-1");
        assert_eq!(ctx.partition, "cloud");
        assert_eq!(ctx.account, "000000000000");
    }

    #[test]
    fn section_can_express_both_channels() {
        let yaml = r#"
existing:
  name: clicks
  arn: arn:cloud:stream:local:000000000000:stream/clicks
create:
  shard_count: 4
"#;
        let section: ResourceSection<StreamProps> = serde_yaml::from_str(yaml).unwrap();
        assert!(section.existing.is_some());
        assert_eq!(section.create.unwrap().shard_count, Some(4));
    }

    #[test]
    fn data_format_defaults_to_json() {
        assert_eq!(DataFormat::default(), DataFormat::Json);
        assert_eq!(DataFormat::Parquet.catalog_name(), "parquet");
    }

    #[test]
    fn job_default_args_parse_as_map() {
        let yaml = r#"
script_location: store://scripts/etl.py
worker_count: 4
default_args:
  "--extra_jars": store://jars/deps.jar
"#;
        let props: JobProps = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(props.worker_count, Some(4));
        assert_eq!(
            props.default_args.get("--extra_jars").map(String::as_str),
            Some("store://jars/deps.jar")
        );
    }

    #[test]
    fn config_roundtrips_through_yaml() {
        let yaml = r#"
version: "1.0"
pipeline: clickstream
stream:
  create:
    shard_count: 2
    retention_hours: 48
table:
  create:
    name: click_events
    data_format: parquet
    columns:
      - name: ts
        type: timestamp
      - name: session_id
        type: string
job:
  create:
    script_location: store://scripts/etl.py
output_store:
  kind: object_store
  create:
    versioned: false
"#;
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        let text = serde_yaml::to_string(&config).unwrap();
        let back: PipelineConfig = serde_yaml::from_str(&text).unwrap();
        assert_eq!(config, back);
    }
}
