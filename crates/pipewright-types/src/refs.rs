//! Resolved resource references and the pipeline descriptor.
//!
//! A `*Ref` is the identity of one platform resource, either supplied by the
//! caller (reuse) or minted by a provisioner (create). The
//! [`PipelineDescriptor`] is the write-once product of a full resolution and
//! the sole input to policy derivation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::platform::Arn;

/// Logical resource kinds the resolver wires together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Stream,
    Database,
    Table,
    Job,
    OutputStore,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Stream => "stream",
            Self::Database => "database",
            Self::Table => "table",
            Self::Job => "job",
            Self::OutputStore => "output_store",
        };
        f.write_str(s)
    }
}

/// Reference to a managed, partitioned record stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRef {
    pub name: String,
    pub arn: Arn,
}

/// Reference to a schema-catalog database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseRef {
    pub name: String,
    pub arn: Arn,
}

/// Reference to a schema-catalog table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub name: String,
    pub arn: Arn,
}

/// Reference to a managed ETL job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRef {
    pub name: String,
    pub arn: Arn,
}

/// Execution identity the job runs under; policy documents attach here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalRef {
    pub name: String,
    pub arn: Arn,
}

/// Reference to an object-store sink.
///
/// `uri` is the scheme-prefixed location (`store://{name}`) jobs use as a
/// write target; `arn` is the policy-scoping identity of the same resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRef {
    pub name: String,
    pub arn: Arn,
    pub uri: String,
}

/// Resolved output store resources: a primary sink plus an optional
/// secondary store for error records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRefs {
    pub primary: OutputRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<OutputRef>,
}

/// Fully-resolved pipeline wiring.
///
/// Built once per resolution and never mutated; every field is concrete
/// before policy derivation starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDescriptor {
    pub stream: StreamRef,
    pub database: DatabaseRef,
    pub table: TableRef,
    pub job: JobRef,
    pub principal: PrincipalRef,
    pub output: OutputRefs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlatformContext;

    fn sample_descriptor() -> PipelineDescriptor {
        let ctx = PlatformContext::default();
        PipelineDescriptor {
            stream: StreamRef {
                name: "clicks".into(),
                arn: ctx.stream_arn("clicks"),
            },
            database: DatabaseRef {
                name: "analytics".into(),
                arn: ctx.database_arn("analytics"),
            },
            table: TableRef {
                name: "events".into(),
                arn: ctx.table_arn("analytics", "events"),
            },
            job: JobRef {
                name: "clicks-etl".into(),
                arn: ctx.job_arn("clicks-etl"),
            },
            principal: PrincipalRef {
                name: "clicks-etl-role".into(),
                arn: ctx.principal_arn("clicks-etl-role"),
            },
            output: OutputRefs {
                primary: OutputRef {
                    name: "clicks-output".into(),
                    arn: ctx.output_store_arn("clicks-output"),
                    uri: "store://clicks-output".into(),
                },
                secondary: None,
            },
        }
    }

    #[test]
    fn descriptor_roundtrip() {
        let d = sample_descriptor();
        let json = serde_json::to_string(&d).unwrap();
        let back: PipelineDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(d, back);
    }

    #[test]
    fn absent_secondary_output_is_skipped() {
        let d = sample_descriptor();
        let json = serde_json::to_value(&d).unwrap();
        assert!(json["output"].get("secondary").is_none());
    }

    #[test]
    fn resource_kind_display_matches_serde() {
        for kind in [
            ResourceKind::Stream,
            ResourceKind::Database,
            ResourceKind::Table,
            ResourceKind::Job,
            ResourceKind::OutputStore,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json.as_str().unwrap(), kind.to_string());
        }
    }
}
