//! Maps store aggregation results into GraphQL buckets.

use serde::Serialize;
use serde_json::Value;

use crate::query::AggregationType;

/// Metric value as computed by the store for one aggregation or group.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Avg(Value),
    Min(Value),
    Max(Value),
    Sum(Value),
    Count(u64),
    Stats {
        avg: Value,
        min: Value,
        max: Value,
        sum: Value,
        count: u64,
    },
    /// Matched rows, passed through as-is
    Entities(Vec<Value>),
}

impl MetricValue {
    /// Result entries in output order. Stats expands to avg, min, max, sum.
    fn into_entries(self) -> Vec<AggregationResultEntry> {
        match self {
            MetricValue::Avg(value) => vec![AggregationResultEntry::new(AggregationType::Avg, value)],
            MetricValue::Min(value) => vec![AggregationResultEntry::new(AggregationType::Min, value)],
            MetricValue::Max(value) => vec![AggregationResultEntry::new(AggregationType::Max, value)],
            MetricValue::Sum(value) => vec![AggregationResultEntry::new(AggregationType::Sum, value)],
            MetricValue::Count(count) => {
                vec![AggregationResultEntry::new(AggregationType::Count, count.into())]
            }
            MetricValue::Stats {
                avg, min, max, sum, ..
            } => vec![
                AggregationResultEntry::new(AggregationType::Avg, avg),
                AggregationResultEntry::new(AggregationType::Min, min),
                AggregationResultEntry::new(AggregationType::Max, max),
                AggregationResultEntry::new(AggregationType::Sum, sum),
            ],
            MetricValue::Entities(rows) => vec![AggregationResultEntry {
                kind: "entities".to_string(),
                result: Value::Array(rows),
            }],
        }
    }
}

/// One group of a grouped aggregation: its dimension values and metric.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupEntry {
    /// `(group-by field, value)` in group-by order
    pub key: Vec<(String, Value)>,
    pub metric: MetricValue,
}

impl GroupEntry {
    pub fn new(key: Vec<(String, Value)>, metric: MetricValue) -> Self {
        Self { key, metric }
    }
}

/// Raw aggregation result returned by an entity store.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationResult {
    Metric { name: String, value: MetricValue },
    Grouped { name: String, groups: Vec<GroupEntry> },
    /// Result kind this crate does not know how to expose
    Other { name: String, kind: String },
}

impl AggregationResult {
    pub fn metric(name: impl Into<String>, value: MetricValue) -> Self {
        AggregationResult::Metric {
            name: name.into(),
            value,
        }
    }

    pub fn grouped(name: impl Into<String>, groups: Vec<GroupEntry>) -> Self {
        AggregationResult::Grouped {
            name: name.into(),
            groups,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            AggregationResult::Metric { name, .. }
            | AggregationResult::Grouped { name, .. }
            | AggregationResult::Other { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationBucketSet {
    pub name: String,
    pub buckets: Vec<AggregationBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationBucket {
    pub keys: Vec<AggregationKey>,
    pub results: Vec<AggregationResultEntry>,
}

/// One group-by dimension of a bucket.
///
/// `value` is the display form of the group value, since the GraphQL key
/// type is a string: text as-is, `null` as `""`, anything else as its JSON
/// text (`true`, `12`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregationKey {
    pub field: String,
    pub value: String,
}

impl AggregationKey {
    fn new(field: String, value: Value) -> Self {
        let value = match value {
            Value::String(text) => text,
            Value::Null => String::new(),
            other => other.to_string(),
        };
        Self { field, value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResultEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub result: Value,
}

impl AggregationResultEntry {
    pub fn new(kind: AggregationType, result: Value) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            result,
        }
    }
}

pub struct AggregationResultMapper;

impl AggregationResultMapper {
    pub fn map_one(result: AggregationResult) -> AggregationBucketSet {
        match result {
            AggregationResult::Metric { name, value } => AggregationBucketSet {
                name,
                buckets: vec![AggregationBucket {
                    keys: Vec::new(),
                    results: value.into_entries(),
                }],
            },
            AggregationResult::Grouped { name, groups } => AggregationBucketSet {
                name,
                buckets: groups
                    .into_iter()
                    .map(|group| AggregationBucket {
                        keys: group
                            .key
                            .into_iter()
                            .map(|(field, value)| AggregationKey::new(field, value))
                            .collect(),
                        results: group.metric.into_entries(),
                    })
                    .collect(),
            },
            AggregationResult::Other { name, kind } => {
                tracing::warn!(
                    "Aggregation '{}' has unsupported result kind '{}', no buckets emitted",
                    name,
                    kind
                );
                AggregationBucketSet {
                    name,
                    buckets: Vec::new(),
                }
            }
        }
    }

    /// Maps every result, preserving order.
    pub fn map_many(results: impl IntoIterator<Item = AggregationResult>) -> Vec<AggregationBucketSet> {
        results.into_iter().map(Self::map_one).collect()
    }
}
