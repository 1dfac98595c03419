//! Recommended telemetry alarms for a resolved stream.
//!
//! Descriptors only; creating the alarms is a collaborator concern like
//! every other side effect.

use serde::Serialize;

use pipewright_types::policy::TELEMETRY_NAMESPACE;
use pipewright_types::refs::StreamRef;

use crate::defaults::DEFAULT_RETENTION_HOURS;
use crate::provision::StreamSettings;

const MS_PER_HOUR: u64 = 3_600_000;

/// How samples are aggregated before the threshold comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmStatistic {
    Average,
    Maximum,
}

/// One recommended alarm on a stream consumption metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlarmSpec {
    pub name: String,
    pub namespace: String,
    pub metric: String,
    /// Dimension pinning the alarm to one stream.
    pub stream_name: String,
    pub statistic: AlarmStatistic,
    pub threshold: f64,
    pub evaluation_periods: u32,
}

/// Compute the recommended alarms for a resolved stream.
///
/// `settings` is the merged creation settings when the stream was created
/// this resolution; `None` for a reused stream, whose retention is unknown
/// here, in which case the default retention seeds the iterator-age
/// threshold.
#[must_use]
pub fn recommended_alarms(stream: &StreamRef, settings: Option<&StreamSettings>) -> Vec<AlarmSpec> {
    let retention_hours = settings
        .map(|s| s.retention_hours)
        .unwrap_or(DEFAULT_RETENTION_HOURS);

    vec![
        // A consumer lagging past half the retention window is at risk of
        // losing records before it reads them.
        AlarmSpec {
            name: format!("{}-iterator-age", stream.name),
            namespace: TELEMETRY_NAMESPACE.to_string(),
            metric: "IteratorAgeMilliseconds".to_string(),
            stream_name: stream.name.clone(),
            statistic: AlarmStatistic::Maximum,
            threshold: (u64::from(retention_hours) * MS_PER_HOUR / 2) as f64,
            evaluation_periods: 1,
        },
        AlarmSpec {
            name: format!("{}-read-pressure", stream.name),
            namespace: TELEMETRY_NAMESPACE.to_string(),
            metric: "ReadProvisionedThroughputExceeded".to_string(),
            stream_name: stream.name.clone(),
            statistic: AlarmStatistic::Average,
            threshold: 0.25,
            evaluation_periods: 5,
        },
    ]
}
