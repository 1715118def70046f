//! Filter expressions and the parser that builds them from `query` arguments.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ErrorCollector, ParseError, ParseErrors};
use crate::schema::EntitySchema;

/// Separator for the values of an `equalsAny` filter on the wire.
pub const EQUALS_ANY_DELIMITER: char = '|';

/// Boolean combinator for `not` and `multi` filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MultiOperator {
    And,
    Or,
}

impl MultiOperator {
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("and") {
            Some(MultiOperator::And)
        } else if value.eq_ignore_ascii_case("or") {
            Some(MultiOperator::Or)
        } else {
            None
        }
    }
}

impl fmt::Display for MultiOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MultiOperator::And => f.write_str("AND"),
            MultiOperator::Or => f.write_str("OR"),
        }
    }
}

/// Boundary operator of a `range` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeOperator {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl RangeOperator {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "gt" => Some(RangeOperator::Gt),
            "gte" => Some(RangeOperator::Gte),
            "lt" => Some(RangeOperator::Lt),
            "lte" => Some(RangeOperator::Lte),
            _ => None,
        }
    }
}

/// Filter tree handed to the entity store. Field paths are entity-qualified.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FilterExpression {
    Equals {
        field: String,
        value: Value,
    },
    EqualsAny {
        field: String,
        values: Vec<Value>,
    },
    Contains {
        field: String,
        value: String,
    },
    Range {
        field: String,
        parameters: BTreeMap<RangeOperator, Value>,
    },
    Not {
        operator: MultiOperator,
        queries: Vec<FilterExpression>,
    },
    Multi {
        operator: MultiOperator,
        queries: Vec<FilterExpression>,
    },
}

impl FilterExpression {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpression::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Field path of a leaf filter; `None` for combinators.
    pub fn field(&self) -> Option<&str> {
        match self {
            FilterExpression::Equals { field, .. }
            | FilterExpression::EqualsAny { field, .. }
            | FilterExpression::Contains { field, .. }
            | FilterExpression::Range { field, .. } => Some(field),
            FilterExpression::Not { .. } | FilterExpression::Multi { .. } => None,
        }
    }

    /// Nested filters of a combinator; empty for leaves.
    pub fn queries(&self) -> &[FilterExpression] {
        match self {
            FilterExpression::Not { queries, .. } | FilterExpression::Multi { queries, .. } => {
                queries
            }
            _ => &[],
        }
    }
}

/// Rewrites every `parameters: [{operator, value}]` list in a filter tree into
/// an operator-keyed object. Later duplicates of an operator win.
pub fn normalize_range_parameters(node: &Value) -> Value {
    let Value::Object(object) = node else {
        return node.clone();
    };

    let mut normalized = object.clone();
    if let Some(Value::Array(parameters)) = object.get("parameters") {
        let mut by_operator = Map::new();
        for parameter in parameters {
            let operator = parameter.get("operator").and_then(Value::as_str);
            let value = parameter.get("value");
            if let (Some(operator), Some(value)) = (operator, value) {
                by_operator.insert(operator.to_string(), value.clone());
            }
        }
        normalized.insert("parameters".to_string(), Value::Object(by_operator));
    }

    if let Some(Value::Array(queries)) = object.get("queries") {
        let nested = queries.iter().map(normalize_range_parameters).collect();
        normalized.insert("queries".to_string(), Value::Array(nested));
    }

    Value::Object(normalized)
}

/// Parses filter nodes against one entity schema.
pub struct FilterParser<'a> {
    schema: &'a EntitySchema,
}

impl<'a> FilterParser<'a> {
    pub fn new(schema: &'a EntitySchema) -> Self {
        Self { schema }
    }

    /// Parses one node and, recursively, its nested `queries`.
    ///
    /// Problems are recorded in `errors` under `path`; `None` is returned when
    /// this node or any of its children was malformed.
    pub fn parse(
        &self,
        node: &Value,
        path: &str,
        errors: &mut ErrorCollector,
    ) -> Option<FilterExpression> {
        let Some(object) = node.as_object() else {
            errors.malformed(path, "filter must be an object");
            return None;
        };

        let Some(kind) = object.get("type").and_then(Value::as_str) else {
            errors.malformed(path, "parameter 'type' is missing");
            return None;
        };

        match kind {
            "equals" => {
                let field = self.field(object, kind, path, errors);
                let value = scalar_value(object, kind, path, errors);
                Some(FilterExpression::Equals {
                    field: field?,
                    value: value?,
                })
            }
            "equalsAny" => {
                let field = self.field(object, kind, path, errors);
                let values = equals_any_values(object, path, errors);
                Some(FilterExpression::EqualsAny {
                    field: field?,
                    values: values?,
                })
            }
            "contains" => {
                let field = self.field(object, kind, path, errors);
                let value = scalar_value(object, kind, path, errors).map(|value| match value {
                    Value::String(text) => text,
                    other => other.to_string(),
                });
                Some(FilterExpression::Contains {
                    field: field?,
                    value: value?,
                })
            }
            "range" => {
                let field = self.field(object, kind, path, errors);
                let parameters = range_parameters(object, path, errors);
                Some(FilterExpression::Range {
                    field: field?,
                    parameters: parameters?,
                })
            }
            "not" | "multi" => {
                let operator = combinator_operator(object, kind, path, errors);
                let queries = self.nested(object, kind, path, errors);
                let (operator, queries) = (operator?, queries?);
                Some(if kind == "not" {
                    FilterExpression::Not { operator, queries }
                } else {
                    FilterExpression::Multi { operator, queries }
                })
            }
            other => {
                errors.malformed(path, format!("unsupported filter type '{}'", other));
                None
            }
        }
    }

    fn field(
        &self,
        object: &Map<String, Value>,
        kind: &str,
        path: &str,
        errors: &mut ErrorCollector,
    ) -> Option<String> {
        match object.get("field").and_then(Value::as_str) {
            Some(field) if !field.is_empty() => Some(self.schema.qualify(field)),
            _ => {
                errors.malformed(
                    path,
                    format!("parameter 'field' for {} filter is missing", kind),
                );
                None
            }
        }
    }

    fn nested(
        &self,
        object: &Map<String, Value>,
        kind: &str,
        path: &str,
        errors: &mut ErrorCollector,
    ) -> Option<Vec<FilterExpression>> {
        let queries = match object.get("queries").and_then(Value::as_array) {
            Some(queries) if !queries.is_empty() => queries,
            _ => {
                errors.malformed(
                    path,
                    format!("parameter 'queries' for {} filter is missing", kind),
                );
                return None;
            }
        };

        let before = errors.len();
        let parsed: Vec<FilterExpression> = queries
            .iter()
            .enumerate()
            .filter_map(|(index, query)| {
                self.parse(query, &format!("{}/queries/{}", path, index), errors)
            })
            .collect();

        (errors.len() == before).then_some(parsed)
    }
}

fn scalar_value(
    object: &Map<String, Value>,
    kind: &str,
    path: &str,
    errors: &mut ErrorCollector,
) -> Option<Value> {
    match object.get("value") {
        Some(Value::String(text)) if text.is_empty() => {
            errors.malformed(path, format!("parameter 'value' for {} filter is empty", kind));
            None
        }
        Some(value @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => Some(value.clone()),
        Some(Value::Null) | None => {
            errors.malformed(
                path,
                format!("parameter 'value' for {} filter is missing", kind),
            );
            None
        }
        Some(_) => {
            errors.malformed(
                path,
                format!("parameter 'value' for {} filter must be a scalar", kind),
            );
            None
        }
    }
}

fn equals_any_values(
    object: &Map<String, Value>,
    path: &str,
    errors: &mut ErrorCollector,
) -> Option<Vec<Value>> {
    let values: Vec<Value> = match object.get("value") {
        Some(Value::String(joined)) => joined
            .split(EQUALS_ANY_DELIMITER)
            .filter(|part| !part.is_empty())
            .map(|part| Value::String(part.to_string()))
            .collect(),
        Some(Value::Array(values)) => values.iter().filter(|v| !v.is_null()).cloned().collect(),
        _ => {
            errors.malformed(path, "parameter 'value' for equalsAny filter is missing");
            return None;
        }
    };

    if values.is_empty() {
        errors.malformed(path, "parameter 'value' for equalsAny filter has no values");
        return None;
    }
    Some(values)
}

fn range_parameters(
    object: &Map<String, Value>,
    path: &str,
    errors: &mut ErrorCollector,
) -> Option<BTreeMap<RangeOperator, Value>> {
    let pairs: Vec<(&str, &Value)> = match object.get("parameters") {
        Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.as_str(), v)).collect(),
        Some(Value::Array(list)) => list
            .iter()
            .filter_map(|item| {
                let operator = item.get("operator").and_then(Value::as_str)?;
                Some((operator, item.get("value")?))
            })
            .collect(),
        _ => {
            errors.malformed(path, "parameter 'parameters' for range filter is missing");
            return None;
        }
    };

    let mut parameters = BTreeMap::new();
    let mut valid = true;
    for (operator, value) in pairs {
        match RangeOperator::parse(operator) {
            Some(operator) => {
                parameters.insert(operator, value.clone());
            }
            None => {
                errors.malformed(path, format!("unsupported range operator '{}'", operator));
                valid = false;
            }
        }
    }

    if !valid {
        return None;
    }
    if parameters.is_empty() {
        errors.malformed(path, "range filter needs at least one parameter");
        return None;
    }
    Some(parameters)
}

fn combinator_operator(
    object: &Map<String, Value>,
    kind: &str,
    path: &str,
    errors: &mut ErrorCollector,
) -> Option<MultiOperator> {
    let Some(raw) = object.get("operator").and_then(Value::as_str) else {
        errors.malformed(
            path,
            format!("parameter 'operator' for {} filter is missing", kind),
        );
        return None;
    };
    let operator = MultiOperator::parse(raw);
    if operator.is_none() {
        errors.malformed(
            path,
            format!("operator '{}' for {} filter must be AND or OR", raw, kind),
        );
    }
    operator
}

/// Parses a complete filter tree, normalizing range parameters first.
pub fn parse_filter(node: &Value, schema: &EntitySchema) -> Result<FilterExpression, ParseErrors> {
    let mut errors = ErrorCollector::new();
    let normalized = normalize_range_parameters(node);
    let parsed = FilterParser::new(schema).parse(&normalized, "/query", &mut errors);
    match (parsed, errors.finish()) {
        (Some(filter), Ok(())) => Ok(filter),
        (_, Err(errors)) => Err(errors),
        (None, Ok(())) => Err(ParseError::MalformedFilter {
            path: "/query".to_string(),
            reason: "filter could not be parsed".to_string(),
        }
        .into()),
    }
}
