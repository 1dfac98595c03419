//! Configuration validation errors.
//!
//! These are the rule violations a pipeline bundle can carry before any
//! provisioner is touched. They serialize so front ends can report the
//! failing rule structurally instead of parsing display strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::refs::ResourceKind;

/// A validation rule violated by a pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ConfigError {
    /// No way to derive the table schema: nothing existing, no props, no fields.
    #[error(
        "no schema source provided: supply an existing table, table properties, or a field schema"
    )]
    MissingSchemaSource,

    /// A resource section supplied both an existing reference and creation props.
    #[error("{resource}: `existing` and `create` are mutually exclusive; supply exactly one")]
    MutuallyExclusive { resource: ResourceKind },

    /// The job section supplied neither an existing job nor creation props.
    #[error("job: supply either `existing` or `create`; the job has no default")]
    MissingJobSpec,

    /// The output store kind is not one this resolver knows how to provision.
    #[error("output_store: unsupported kind `{kind}`")]
    UnsupportedOutputKind { kind: String },

    /// The config file declares a version this resolver does not speak.
    #[error("unsupported config version `{version}` (expected \"1.0\")")]
    UnsupportedVersion { version: String },

    /// The pipeline has no name to derive resource names from.
    #[error("pipeline: `name` must be a non-empty string")]
    MissingPipelineName,

    /// A field holds a value outside its allowed range.
    #[error("{field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    #[must_use]
    pub fn mutually_exclusive(resource: ResourceKind) -> Self {
        Self::MutuallyExclusive { resource }
    }

    #[must_use]
    pub fn unsupported_output_kind(kind: impl Into<String>) -> Self {
        Self::UnsupportedOutputKind { kind: kind.into() }
    }

    #[must_use]
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_resource() {
        let err = ConfigError::mutually_exclusive(ResourceKind::Stream);
        assert_eq!(
            err.to_string(),
            "stream: `existing` and `create` are mutually exclusive; supply exactly one"
        );
    }

    #[test]
    fn serializes_with_rule_tag() {
        let err = ConfigError::unsupported_output_kind("queue");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["rule"], "unsupported_output_kind");
        assert_eq!(json["kind"], "queue");
    }

    #[test]
    fn missing_schema_source_roundtrip() {
        let err = ConfigError::MissingSchemaSource;
        let json = serde_json::to_string(&err).unwrap();
        let back: ConfigError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }

    #[test]
    fn invalid_value_carries_field_and_reason() {
        let err = ConfigError::invalid_value("stream.create.shard_count", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "stream.create.shard_count: must be at least 1"
        );
    }
}
