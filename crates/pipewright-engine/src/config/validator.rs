//! Semantic validation for parsed pipeline configuration values.
//!
//! Rules run in a fixed order and the first violation wins, so a given
//! config always reports the same error. Validation also lowers the raw
//! section pairs into the typed [`ConfigurationBundle`]; nothing downstream
//! sees an ambiguous specification.

use pipewright_types::error::ConfigError;
use pipewright_types::platform::Arn;
use pipewright_types::refs::{DatabaseRef, JobRef, OutputRef, ResourceKind, StreamRef, TableRef};

use crate::config::bundle::{
    ConfigurationBundle, JobSpec, OutputStoreKind, OutputStoreSpec, ResourceSpec, SchemaSource,
    SchemaSourceKind, SchemaSpec, TableSchema,
};
use crate::config::types::{
    ExistingOutput, ExistingResource, JobProps, OutputStoreSection, PipelineConfig,
    ResourceSection,
};

const SUPPORTED_VERSION: &str = "1.0";

/// Validate a parsed pipeline configuration and lower it into a typed bundle.
///
/// Rule order: schema source presence, one specification channel per
/// resource (stream, database, job, output store), supported output kind,
/// then structural value checks. The table section is exempt from the
/// channel rule: its `existing`/`create` pair is part of the schema
/// precedence triple and shadowed sources are logged, not rejected.
///
/// # Errors
///
/// Returns the first [`ConfigError`] violated by the config.
pub fn validate(config: &PipelineConfig) -> Result<ConfigurationBundle, ConfigError> {
    // Rule 1: at least one schema source must be present.
    let schema = schema_spec(config).ok_or(ConfigError::MissingSchemaSource)?;

    // Rule 2: exactly one specification channel per resource.
    single_channel(config.stream.as_ref(), ResourceKind::Stream)?;
    single_channel(config.database.as_ref(), ResourceKind::Database)?;
    let job = job_spec(config.job.as_ref())?;

    // Rule 3: the output sink kind must be one we can provision.
    let output_store = output_store_spec(config.output_store.as_ref())?;

    // Structural checks.
    if config.version != SUPPORTED_VERSION {
        return Err(ConfigError::UnsupportedVersion {
            version: config.version.clone(),
        });
    }
    if config.pipeline.trim().is_empty() {
        return Err(ConfigError::MissingPipelineName);
    }
    if let Some(props) = config.stream.as_ref().and_then(|s| s.create.as_ref()) {
        positive(props.shard_count, "stream.create.shard_count")?;
        positive(props.retention_hours, "stream.create.retention_hours")?;
    }
    if let JobSpec::Create(props) = &job {
        if props.script_location.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "job.create.script_location",
                "must not be empty",
            ));
        }
        positive(props.worker_count, "job.create.worker_count")?;
        positive(props.timeout_minutes, "job.create.timeout_minutes")?;
    }

    for ignored in &schema.shadowed {
        tracing::warn!(
            active = %schema.source.kind(),
            ignored = %ignored,
            "Schema source shadowed by a higher-precedence source"
        );
    }

    Ok(ConfigurationBundle {
        pipeline: config.pipeline.clone(),
        platform: config.platform_context(),
        stream: spec_from_section(config.stream.as_ref(), |e| StreamRef {
            name: e.name.clone(),
            arn: Arn::new(e.arn.clone()),
        }),
        database: spec_from_section(config.database.as_ref(), |e| DatabaseRef {
            name: e.name.clone(),
            arn: Arn::new(e.arn.clone()),
        }),
        schema,
        job,
        output_store,
    })
}

/// Resolve the schema precedence triple, recording shadowed sources.
/// `None` means no source is present at all.
fn schema_spec(config: &PipelineConfig) -> Option<SchemaSpec> {
    let table = config.table.as_ref();
    let existing = table.and_then(|t| t.existing.as_ref());
    let props = table.and_then(|t| t.create.as_ref());
    let fields = config.schema.as_deref();

    if let Some(e) = existing {
        let mut shadowed = Vec::new();
        if props.is_some() {
            shadowed.push(SchemaSourceKind::TableProps);
        }
        if fields.is_some() {
            shadowed.push(SchemaSourceKind::FieldSchema);
        }
        Some(SchemaSpec {
            source: SchemaSource::ExistingTable(TableRef {
                name: e.name.clone(),
                arn: Arn::new(e.arn.clone()),
            }),
            shadowed,
        })
    } else if let Some(p) = props {
        let shadowed = if fields.is_some() {
            vec![SchemaSourceKind::FieldSchema]
        } else {
            Vec::new()
        };
        Some(SchemaSpec {
            source: SchemaSource::Create(TableSchema::Props(p.clone())),
            shadowed,
        })
    } else {
        fields.map(|f| SchemaSpec {
            source: SchemaSource::Create(TableSchema::Fields(f.to_vec())),
            shadowed: Vec::new(),
        })
    }
}

fn single_channel<P>(
    section: Option<&ResourceSection<P>>,
    resource: ResourceKind,
) -> Result<(), ConfigError> {
    match section {
        Some(s) if s.existing.is_some() && s.create.is_some() => {
            Err(ConfigError::mutually_exclusive(resource))
        }
        _ => Ok(()),
    }
}

fn job_spec(section: Option<&ResourceSection<JobProps>>) -> Result<JobSpec, ConfigError> {
    let Some(section) = section else {
        return Err(ConfigError::MissingJobSpec);
    };
    match (&section.existing, &section.create) {
        (Some(_), Some(_)) => Err(ConfigError::mutually_exclusive(ResourceKind::Job)),
        (Some(e), None) => Ok(JobSpec::Existing(JobRef {
            name: e.name.clone(),
            arn: Arn::new(e.arn.clone()),
        })),
        (None, Some(p)) => Ok(JobSpec::Create(p.clone())),
        (None, None) => Err(ConfigError::MissingJobSpec),
    }
}

fn output_store_spec(section: Option<&OutputStoreSection>) -> Result<OutputStoreSpec, ConfigError> {
    let Some(section) = section else {
        return Ok(OutputStoreSpec {
            kind: OutputStoreKind::ObjectStore,
            channel: ResourceSpec::Default,
        });
    };
    if section.existing.is_some() && section.create.is_some() {
        return Err(ConfigError::mutually_exclusive(ResourceKind::OutputStore));
    }
    let kind = match section.kind.as_deref() {
        None => OutputStoreKind::ObjectStore,
        Some(k) => {
            OutputStoreKind::parse(k).ok_or_else(|| ConfigError::unsupported_output_kind(k))?
        }
    };
    let channel = match (&section.existing, &section.create) {
        (Some(e), _) => ResourceSpec::Existing(output_ref(e)),
        (None, Some(p)) => ResourceSpec::Create(p.clone()),
        (None, None) => ResourceSpec::Default,
    };
    Ok(OutputStoreSpec { kind, channel })
}

fn output_ref(e: &ExistingOutput) -> OutputRef {
    OutputRef {
        name: e.name.clone(),
        arn: Arn::new(e.arn.clone()),
        uri: e
            .uri
            .clone()
            .unwrap_or_else(|| format!("store://{}", e.name)),
    }
}

fn spec_from_section<P: Clone, R>(
    section: Option<&ResourceSection<P>>,
    to_ref: impl FnOnce(&ExistingResource) -> R,
) -> ResourceSpec<R, P> {
    match section {
        Some(ResourceSection {
            existing: Some(e), ..
        }) => ResourceSpec::Existing(to_ref(e)),
        Some(ResourceSection {
            create: Some(p), ..
        }) => ResourceSpec::Create(p.clone()),
        _ => ResourceSpec::Default,
    }
}

fn positive(value: Option<u32>, field: &str) -> Result<(), ConfigError> {
    match value {
        Some(0) => Err(ConfigError::invalid_value(field, "must be at least 1")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parser::parse_pipeline_str;

    fn valid_yaml() -> &'static str {
        r#"
version: "1.0"
pipeline: clickstream
schema:
  - name: ts
    type: timestamp
  - name: session_id
    type: string
job:
  create:
    script_location: store://scripts/etl.py
"#
    }

    fn validate_yaml(yaml: &str) -> Result<ConfigurationBundle, ConfigError> {
        let config = parse_pipeline_str(yaml).unwrap();
        validate(&config)
    }

    #[test]
    fn test_valid_pipeline_passes() {
        let bundle = validate_yaml(valid_yaml()).unwrap();
        assert_eq!(bundle.pipeline, "clickstream");
        assert_eq!(bundle.stream, ResourceSpec::Default);
        assert_eq!(bundle.schema.source.kind(), SchemaSourceKind::FieldSchema);
        assert!(bundle.schema.shadowed.is_empty());
        assert!(matches!(bundle.job, JobSpec::Create(_)));
        assert_eq!(bundle.output_store.kind, OutputStoreKind::ObjectStore);
    }

    #[test]
    fn test_no_schema_source_fails() {
        let err = validate_yaml(
            r#"
pipeline: clickstream
job:
  create:
    script_location: store://scripts/etl.py
"#,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::MissingSchemaSource);
    }

    #[test]
    fn test_schema_rule_wins_over_channel_rule() {
        // No schema source and a double-specified stream: the schema rule
        // is checked first.
        let err = validate_yaml(
            r#"
pipeline: clickstream
stream:
  existing:
    name: clicks
    arn: arn:cloud:stream:local:000000000000:stream/clicks
  create:
    shard_count: 2
job:
  create:
    script_location: store://scripts/etl.py
"#,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::MissingSchemaSource);
    }

    #[test]
    fn test_stream_both_channels_fails() {
        let yaml = format!(
            "{}\nstream:\n  existing:\n    name: clicks\n    arn: arn:x\n  create:\n    shard_count: 2\n",
            valid_yaml().trim_end()
        );
        let err = validate_yaml(&yaml).unwrap_err();
        assert_eq!(
            err,
            ConfigError::mutually_exclusive(ResourceKind::Stream)
        );
    }

    #[test]
    fn test_database_both_channels_fails() {
        let yaml = format!(
            "{}\ndatabase:\n  existing:\n    name: analytics\n    arn: arn:x\n  create:\n    name: analytics\n",
            valid_yaml().trim_end()
        );
        let err = validate_yaml(&yaml).unwrap_err();
        assert_eq!(
            err,
            ConfigError::mutually_exclusive(ResourceKind::Database)
        );
    }

    #[test]
    fn test_job_both_channels_fails() {
        let err = validate_yaml(
            r#"
pipeline: clickstream
schema:
  - name: ts
    type: timestamp
job:
  existing:
    name: legacy-etl
    arn: arn:x
  create:
    script_location: store://scripts/etl.py
"#,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::mutually_exclusive(ResourceKind::Job));
    }

    #[test]
    fn test_channel_rule_checks_stream_before_job() {
        let err = validate_yaml(
            r#"
pipeline: clickstream
schema:
  - name: ts
    type: timestamp
stream:
  existing:
    name: clicks
    arn: arn:x
  create:
    shard_count: 2
job:
  existing:
    name: legacy-etl
    arn: arn:x
  create:
    script_location: store://scripts/etl.py
"#,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::mutually_exclusive(ResourceKind::Stream));
    }

    #[test]
    fn test_missing_job_section_fails() {
        let err = validate_yaml(
            r#"
pipeline: clickstream
schema:
  - name: ts
    type: timestamp
"#,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::MissingJobSpec);
    }

    #[test]
    fn test_empty_job_section_fails() {
        let err = validate_yaml(
            r#"
pipeline: clickstream
schema:
  - name: ts
    type: timestamp
job: {}
"#,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::MissingJobSpec);
    }

    #[test]
    fn test_unsupported_output_kind_fails() {
        let yaml = format!(
            "{}\noutput_store:\n  kind: queue\n",
            valid_yaml().trim_end()
        );
        let err = validate_yaml(&yaml).unwrap_err();
        assert_eq!(err, ConfigError::unsupported_output_kind("queue"));
    }

    #[test]
    fn test_output_kind_checked_before_version() {
        let yaml = r#"
version: "2.0"
pipeline: clickstream
schema:
  - name: ts
    type: timestamp
job:
  create:
    script_location: store://scripts/etl.py
output_store:
  kind: queue
"#;
        let err = validate_yaml(yaml).unwrap_err();
        assert_eq!(err, ConfigError::unsupported_output_kind("queue"));
    }

    #[test]
    fn test_wrong_version_fails() {
        let yaml = valid_yaml().replace("\"1.0\"", "\"2.0\"");
        let err = validate_yaml(&yaml).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnsupportedVersion {
                version: "2.0".to_string()
            }
        );
    }

    #[test]
    fn test_empty_pipeline_name_fails() {
        let yaml = valid_yaml().replace("clickstream", "\"  \"");
        let err = validate_yaml(&yaml).unwrap_err();
        assert_eq!(err, ConfigError::MissingPipelineName);
    }

    #[test]
    fn test_zero_shard_count_fails() {
        let yaml = format!(
            "{}\nstream:\n  create:\n    shard_count: 0\n",
            valid_yaml().trim_end()
        );
        let err = validate_yaml(&yaml).unwrap_err();
        assert_eq!(
            err,
            ConfigError::invalid_value("stream.create.shard_count", "must be at least 1")
        );
    }

    #[test]
    fn test_zero_worker_count_fails() {
        let yaml = valid_yaml().replace(
            "script_location: store://scripts/etl.py",
            "script_location: store://scripts/etl.py\n    worker_count: 0",
        );
        let err = validate_yaml(&yaml).unwrap_err();
        assert_eq!(
            err,
            ConfigError::invalid_value("job.create.worker_count", "must be at least 1")
        );
    }

    #[test]
    fn test_blank_script_location_fails() {
        let yaml = valid_yaml().replace("store://scripts/etl.py", "\"   \"");
        let err = validate_yaml(&yaml).unwrap_err();
        assert_eq!(
            err,
            ConfigError::invalid_value("job.create.script_location", "must not be empty")
        );
    }

    #[test]
    fn test_existing_table_shadows_props_and_fields() {
        let bundle = validate_yaml(
            r#"
pipeline: clickstream
table:
  existing:
    name: click_events
    arn: arn:cloud:catalog:local:000000000000:table/analytics/click_events
  create:
    name: other_name
schema:
  - name: ts
    type: timestamp
job:
  create:
    script_location: store://scripts/etl.py
"#,
        )
        .unwrap();
        assert_eq!(bundle.schema.source.kind(), SchemaSourceKind::ExistingTable);
        assert_eq!(
            bundle.schema.shadowed,
            vec![SchemaSourceKind::TableProps, SchemaSourceKind::FieldSchema]
        );
    }

    #[test]
    fn test_table_props_shadow_field_schema() {
        let bundle = validate_yaml(
            r#"
pipeline: clickstream
table:
  create:
    name: click_events
    columns:
      - name: ts
        type: timestamp
schema:
  - name: other
    type: string
job:
  create:
    script_location: store://scripts/etl.py
"#,
        )
        .unwrap();
        assert_eq!(bundle.schema.source.kind(), SchemaSourceKind::TableProps);
        assert_eq!(bundle.schema.shadowed, vec![SchemaSourceKind::FieldSchema]);
    }

    #[test]
    fn test_existing_output_uri_defaults_from_name() {
        let yaml = format!(
            "{}\noutput_store:\n  existing:\n    name: archive\n    arn: arn:cloud:store:::archive\n",
            valid_yaml().trim_end()
        );
        let bundle = validate_yaml(&yaml).unwrap();
        match bundle.output_store.channel {
            ResourceSpec::Existing(out) => {
                assert_eq!(out.uri, "store://archive");
                assert_eq!(out.name, "archive");
            }
            other => panic!("expected existing output channel, got {other:?}"),
        }
    }

    #[test]
    fn test_output_store_both_channels_fails() {
        let yaml = format!(
            "{}\noutput_store:\n  existing:\n    name: archive\n    arn: arn:x\n  create:\n    versioned: true\n",
            valid_yaml().trim_end()
        );
        let err = validate_yaml(&yaml).unwrap_err();
        assert_eq!(
            err,
            ConfigError::mutually_exclusive(ResourceKind::OutputStore)
        );
    }

    #[test]
    fn test_existing_stream_lowered_to_typed_ref() {
        let yaml = format!(
            "{}\nstream:\n  existing:\n    name: clicks\n    arn: arn:cloud:stream:local:000000000000:stream/clicks\n",
            valid_yaml().trim_end()
        );
        let bundle = validate_yaml(&yaml).unwrap();
        match bundle.stream {
            ResourceSpec::Existing(stream) => {
                assert_eq!(stream.name, "clicks");
                assert_eq!(
                    stream.arn.as_str(),
                    "arn:cloud:stream:local:000000000000:stream/clicks"
                );
            }
            other => panic!("expected existing stream, got {other:?}"),
        }
    }
}
