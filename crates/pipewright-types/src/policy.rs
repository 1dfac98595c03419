//! Access-policy document model.
//!
//! A [`PolicyDocument`] is an ordered list of allow/deny statements rendered
//! to JSON for the platform's identity service. Statements are assembled by
//! the engine's policy builder; this module only defines the shape and the
//! action/condition vocabulary shared across the workspace.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Document format version emitted in every policy.
pub const POLICY_VERSION: &str = "1.0";

/// Namespace jobs publish runtime metrics under.
pub const TELEMETRY_NAMESPACE: &str = "EtlJobs";

/// Condition key constraining which telemetry namespace may be written.
pub const CONDITION_TELEMETRY_NAMESPACE: &str = "telemetry:namespace";

/// Condition key requiring transport-level encryption.
pub const CONDITION_SECURE_TRANSPORT: &str = "transport:secure";

/// Wildcard resource scope.
pub const SCOPE_ANY: &str = "*";

pub const ACTION_GET_JOB: &str = "jobs:GetJob";
pub const ACTION_GET_SECURITY_CONFIGURATION: &str = "security:GetConfiguration";
pub const ACTION_GET_TABLE: &str = "catalog:GetTable";
pub const ACTION_PUT_METRIC_DATA: &str = "telemetry:PutMetricData";

/// Everything a consumer needs to read a stream, and nothing more.
pub const STREAM_CONSUMER_ACTIONS: [&str; 6] = [
    "stream:DescribeStream",
    "stream:DescribeStreamSummary",
    "stream:GetRecords",
    "stream:GetShardIterator",
    "stream:ListShards",
    "stream:SubscribeToShard",
];

/// Whether a statement grants or revokes its actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Allow,
    Deny,
}

/// Condition block keyed by operator, then by condition key.
///
/// `BTreeMap` keeps serialization order stable so two builds of the same
/// policy produce byte-identical JSON.
pub type ConditionMap = BTreeMap<String, BTreeMap<String, String>>;

/// One statement of a policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Statement {
    pub sid: String,
    pub effect: Effect,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
    #[serde(default, skip_serializing_if = "ConditionMap::is_empty")]
    pub conditions: ConditionMap,
}

impl Statement {
    /// Start an allow statement with the given statement id.
    #[must_use]
    pub fn allow(sid: impl Into<String>) -> Self {
        Self {
            sid: sid.into(),
            effect: Effect::Allow,
            actions: Vec::new(),
            resources: Vec::new(),
            conditions: ConditionMap::new(),
        }
    }

    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    #[must_use]
    pub fn actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions.extend(actions.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resources.push(resource.into());
        self
    }

    #[must_use]
    pub fn condition(
        mut self,
        operator: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.conditions
            .entry(operator.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }
}

/// Ordered policy document attached to a job principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PolicyDocument {
    pub version: String,
    pub statements: Vec<Statement>,
}

impl PolicyDocument {
    #[must_use]
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statements,
        }
    }

    /// Render the document as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
