//! Aggregation requests parsed from the `aggregations` argument.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::{ErrorCollector, ParseError};
use crate::schema::EntitySchema;

/// Metric computed by an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationType {
    Avg,
    Min,
    Max,
    Sum,
    Count,
    Stats,
}

impl AggregationType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "avg" => Some(AggregationType::Avg),
            "min" => Some(AggregationType::Min),
            "max" => Some(AggregationType::Max),
            "sum" => Some(AggregationType::Sum),
            "count" => Some(AggregationType::Count),
            "stats" => Some(AggregationType::Stats),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationType::Avg => "avg",
            AggregationType::Min => "min",
            AggregationType::Max => "max",
            AggregationType::Sum => "sum",
            AggregationType::Count => "count",
            AggregationType::Stats => "stats",
        }
    }
}

impl fmt::Display for AggregationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One requested aggregation. `name` correlates the request with its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationRequest {
    #[serde(rename = "type")]
    pub kind: AggregationType,
    pub field: String,
    pub name: String,
    /// Group-by field paths; empty means one global bucket
    pub group_by_fields: Vec<String>,
}

impl AggregationRequest {
    pub fn new(kind: AggregationType, field: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
            name: name.into(),
            group_by_fields: Vec::new(),
        }
    }

    pub fn is_grouped(&self) -> bool {
        !self.group_by_fields.is_empty()
    }
}

/// Parses aggregation lists against one entity schema.
pub struct AggregationParser<'a> {
    schema: &'a EntitySchema,
}

impl<'a> AggregationParser<'a> {
    pub fn new(schema: &'a EntitySchema) -> Self {
        Self { schema }
    }

    /// Parses every entry of `list`, recording problems under `path`.
    ///
    /// Entries that fail are skipped; the rest are returned in input order.
    /// Names are not deduplicated here.
    pub fn parse(
        &self,
        list: &Value,
        path: &str,
        errors: &mut ErrorCollector,
    ) -> Vec<AggregationRequest> {
        let Some(entries) = list.as_array() else {
            errors.push(ParseError::MissingAggregationParameter {
                path: path.to_string(),
                parameter: "aggregations".to_string(),
            });
            return Vec::new();
        };

        entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                self.parse_one(entry, &format!("{}/{}", path, index), errors)
            })
            .collect()
    }

    fn parse_one(
        &self,
        entry: &Value,
        path: &str,
        errors: &mut ErrorCollector,
    ) -> Option<AggregationRequest> {
        let kind = required_str(entry, "type", path, errors);
        let field = required_str(entry, "field", path, errors);
        let name = required_str(entry, "name", path, errors);
        let (kind, field, name) = (kind?, field?, name?);

        let Some(kind) = AggregationType::parse(kind) else {
            errors.push(ParseError::UnknownAggregationType {
                path: path.to_string(),
                kind: kind.to_string(),
            });
            return None;
        };

        let group_by_fields = entry
            .get("groupByFields")
            .and_then(Value::as_array)
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|field| self.schema.qualify(field))
                    .collect()
            })
            .unwrap_or_default();

        Some(AggregationRequest {
            kind,
            field: self.schema.qualify(field),
            name: name.to_string(),
            group_by_fields,
        })
    }
}

fn required_str<'v>(
    entry: &'v Value,
    key: &str,
    path: &str,
    errors: &mut ErrorCollector,
) -> Option<&'v str> {
    let value = entry
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty());
    if value.is_none() {
        errors.push(ParseError::MissingAggregationParameter {
            path: path.to_string(),
            parameter: key.to_string(),
        });
    }
    value
}
