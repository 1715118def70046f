//! Builds [`Criteria`] from raw GraphQL field arguments.

use serde_json::{Map, Value};

use super::aggregation::AggregationParser;
use super::criteria::{Criteria, FieldSorting, SortDirection, TotalCountMode};
use super::filter::{normalize_range_parameters, FilterExpression, FilterParser};
use crate::config::GatewayConfig;
use crate::error::{ErrorCollector, ParseError, ParseErrors};
use crate::result::cursor;
use crate::schema::EntitySchema;

/// Composes pagination, id lookup, sorting, filters and aggregations into one
/// criteria object for an entity.
#[derive(Debug, Clone)]
pub struct CriteriaBuilder<'c> {
    config: &'c GatewayConfig,
}

impl<'c> CriteriaBuilder<'c> {
    pub fn new(config: &'c GatewayConfig) -> Self {
        Self { config }
    }

    /// Builds criteria from `args`.
    ///
    /// # Arguments
    /// * `args` - Field arguments (`first`, `after`, `last`, `before`, `id`,
    ///   `sortBy`, `sortDirection`, `term`, `query`, `postQuery`, `aggregations`)
    /// * `schema` - Entity the arguments refer to
    ///
    /// # Returns
    /// The criteria without associations, or every argument problem found.
    pub fn build(
        &self,
        args: &Map<String, Value>,
        schema: &EntitySchema,
    ) -> Result<Criteria, ParseErrors> {
        let mut criteria = Criteria::new();
        criteria.total_count_mode = TotalCountMode::Exact;
        let mut errors = ErrorCollector::new();

        self.parse_pagination(args, &mut criteria, &mut errors);
        parse_id(args, &mut criteria, schema);
        parse_sorting(args, &mut criteria, &mut errors);
        if let Some(term) = arg(args, "term").and_then(Value::as_str) {
            criteria.term = Some(term.to_string());
        }
        if let Some(filter) = parse_query(args, "query", schema, &mut errors) {
            criteria.add_filter(filter);
        }
        if let Some(filter) = parse_query(args, "postQuery", schema, &mut errors) {
            criteria.add_post_filter(filter);
        }
        self.parse_aggregations(args, &mut criteria, schema, &mut errors);

        errors.finish()?;

        tracing::debug!(
            entity = schema.entity_name(),
            limit = ?criteria.limit,
            offset = ?criteria.offset,
            filters = criteria.filters.len(),
            aggregations = criteria.aggregations().len(),
            "built criteria"
        );
        Ok(criteria)
    }

    fn parse_pagination(
        &self,
        args: &Map<String, Value>,
        criteria: &mut Criteria,
        errors: &mut ErrorCollector,
    ) {
        if let Some(first) = arg(args, "first") {
            let Some(limit) = page_size("first", first, errors) else {
                return;
            };
            criteria.limit = Some(limit);
            if let Some(after) = arg(args, "after") {
                criteria.offset = self.decode_cursor("after", after, errors);
            }
            return;
        }

        let (Some(last), Some(before)) = (arg(args, "last"), arg(args, "before")) else {
            return;
        };
        let Some(limit) = page_size("last", last, errors) else {
            return;
        };
        let Some(position) = self.decode_cursor("before", before, errors) else {
            return;
        };

        let limit = to_i64(limit);
        let offset = position.saturating_sub(limit);
        if offset < 0 && self.config.clamp_negative_offset {
            // rows before row 1 do not exist, so the window shrinks instead
            let clipped = (limit + offset).max(0);
            tracing::warn!(
                "Backward page starts at offset {}, clipping to offset 0 limit {}",
                offset,
                clipped
            );
            criteria.limit = Some(clipped as u64);
            criteria.offset = Some(0);
        } else {
            criteria.limit = Some(limit as u64);
            criteria.offset = Some(offset);
        }
    }

    fn decode_cursor(
        &self,
        argument: &str,
        value: &Value,
        errors: &mut ErrorCollector,
    ) -> Option<i64> {
        let raw = match value {
            Value::String(raw) => raw.as_str(),
            _ => "",
        };
        if self.config.strict_cursors {
            match cursor::try_decode(raw) {
                Ok(position) => Some(to_i64(position)),
                Err(_) => {
                    errors.push(ParseError::InvalidCursor {
                        argument: argument.to_string(),
                    });
                    None
                }
            }
        } else {
            Some(to_i64(cursor::decode(raw)))
        }
    }

    fn parse_aggregations(
        &self,
        args: &Map<String, Value>,
        criteria: &mut Criteria,
        schema: &EntitySchema,
        errors: &mut ErrorCollector,
    ) {
        let Some(list) = arg(args, "aggregations") else {
            return;
        };

        for aggregation in AggregationParser::new(schema).parse(list, "/aggregations", errors) {
            let name = aggregation.name.clone();
            if self.config.unique_aggregation_names && criteria.aggregation(&name).is_some() {
                errors.push(ParseError::DuplicateAggregationName { name });
                continue;
            }
            if criteria.add_aggregation(aggregation) {
                tracing::warn!("Aggregation '{}' requested twice, last one wins", name);
            }
        }
    }
}

/// Argument value, treating explicit `null` as absent.
fn arg<'a>(args: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    args.get(key).filter(|value| !value.is_null())
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn page_size(argument: &str, value: &Value, errors: &mut ErrorCollector) -> Option<u64> {
    let size = value.as_u64();
    if size.is_none() {
        errors.push(ParseError::InvalidPagination {
            argument: argument.to_string(),
            reason: "expected a non-negative integer".to_string(),
        });
    }
    size
}

fn parse_id(args: &Map<String, Value>, criteria: &mut Criteria, schema: &EntitySchema) {
    if let Some(id) = arg(args, "id") {
        criteria.add_filter(FilterExpression::equals(schema.qualify("id"), id.clone()));
    }
}

fn parse_sorting(args: &Map<String, Value>, criteria: &mut Criteria, errors: &mut ErrorCollector) {
    let Some(field) = arg(args, "sortBy").and_then(Value::as_str) else {
        return;
    };
    let direction = match arg(args, "sortDirection") {
        None => SortDirection::Asc,
        Some(raw) => {
            let raw = raw.as_str().unwrap_or_default();
            match SortDirection::parse(raw) {
                Some(direction) => direction,
                None => {
                    errors.push(ParseError::InvalidSortDirection {
                        value: raw.to_string(),
                    });
                    return;
                }
            }
        }
    };
    criteria.add_sorting(FieldSorting::new(field, direction));
}

fn parse_query(
    args: &Map<String, Value>,
    key: &str,
    schema: &EntitySchema,
    errors: &mut ErrorCollector,
) -> Option<FilterExpression> {
    let node = normalize_range_parameters(arg(args, key)?);
    FilterParser::new(schema).parse(&node, &format!("/{}", key), errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{AggregationType, MultiOperator};
    use crate::schema::{FieldDescriptor, FieldKind};
    use serde_json::json;

    fn product() -> EntitySchema {
        EntitySchema::new(
            "product",
            vec![
                FieldDescriptor::id("id"),
                FieldDescriptor::new("name", FieldKind::Text),
                FieldDescriptor::new("price", FieldKind::Numeric),
            ],
        )
        .unwrap()
    }

    fn build_with(config: &GatewayConfig, args: Value) -> Result<Criteria, ParseErrors> {
        let Value::Object(args) = args else {
            panic!("args must be an object");
        };
        CriteriaBuilder::new(config).build(&args, &product())
    }

    fn build(args: Value) -> Criteria {
        build_with(&GatewayConfig::default(), args).unwrap()
    }

    #[test]
    fn test_pagination_forward() {
        let criteria = build(json!({"first": 5, "after": cursor::encode(10)}));
        assert_eq!(criteria.total_count_mode, TotalCountMode::Exact);
        assert_eq!(criteria.limit, Some(5));
        assert_eq!(criteria.offset, Some(10));
    }

    #[test]
    fn test_pagination_forward_without_cursor() {
        let criteria = build(json!({"first": 3}));
        assert_eq!(criteria.limit, Some(3));
        assert_eq!(criteria.offset, None);
    }

    #[test]
    fn test_pagination_backward() {
        let criteria = build(json!({"last": 5, "before": cursor::encode(15)}));
        assert_eq!(criteria.total_count_mode, TotalCountMode::Exact);
        assert_eq!(criteria.limit, Some(5));
        assert_eq!(criteria.offset, Some(10));
    }

    #[test]
    fn test_first_takes_precedence_over_last() {
        let criteria = build(json!({
            "first": 2,
            "last": 5,
            "before": cursor::encode(15)
        }));
        assert_eq!(criteria.limit, Some(2));
        assert_eq!(criteria.offset, None);
    }

    #[test]
    fn test_last_without_before_is_ignored() {
        let criteria = build(json!({"last": 5}));
        assert_eq!(criteria.limit, None);
        assert_eq!(criteria.offset, None);
    }

    #[test]
    fn test_backward_page_before_row_one_is_clipped() {
        let criteria = build(json!({"last": 5, "before": cursor::encode(3)}));
        assert_eq!(criteria.offset, Some(0));
        assert_eq!(criteria.limit, Some(3));
    }

    #[test]
    fn test_backward_page_keeps_negative_offset_when_clamping_disabled() {
        let config = GatewayConfig {
            clamp_negative_offset: false,
            ..GatewayConfig::default()
        };
        let criteria = build_with(&config, json!({"last": 5, "before": cursor::encode(3)})).unwrap();
        assert_eq!(criteria.offset, Some(-2));
        assert_eq!(criteria.limit, Some(5));
    }

    #[test]
    fn test_malformed_cursor_is_row_zero() {
        let criteria = build(json!({"first": 5, "after": "@@nope@@"}));
        assert_eq!(criteria.offset, Some(0));
    }

    #[test]
    fn test_malformed_cursor_rejected_in_strict_mode() {
        let config = GatewayConfig {
            strict_cursors: true,
            ..GatewayConfig::default()
        };
        let errors = build_with(&config, json!({"first": 5, "after": "@@nope@@"})).unwrap_err();
        assert_eq!(
            errors.errors(),
            &[ParseError::InvalidCursor {
                argument: "after".to_string()
            }]
        );
    }

    #[test]
    fn test_negative_page_size_is_rejected() {
        let errors = build_with(&GatewayConfig::default(), json!({"first": -1})).unwrap_err();
        assert!(matches!(
            &errors.errors()[0],
            ParseError::InvalidPagination { argument, .. } if argument == "first"
        ));
    }

    #[test]
    fn test_no_pagination_arguments() {
        let criteria = build(json!({}));
        assert_eq!(criteria.limit, None);
        assert_eq!(criteria.offset, None);
        assert_eq!(criteria.total_count_mode, TotalCountMode::Exact);
    }

    #[test]
    fn test_id_shortcut_is_qualified() {
        let criteria = build(json!({"id": "abc"}));
        assert_eq!(
            criteria.filters,
            vec![FilterExpression::equals("product.id", "abc")]
        );
    }

    #[test]
    fn test_sorting() {
        let criteria = build(json!({"sortBy": "id", "sortDirection": "DESC"}));
        assert_eq!(
            criteria.sorting,
            vec![FieldSorting::new("id", SortDirection::Desc)]
        );
    }

    #[test]
    fn test_sorting_defaults_to_ascending() {
        let criteria = build(json!({"sortBy": "name"}));
        assert_eq!(criteria.sorting[0].direction, SortDirection::Asc);
    }

    #[test]
    fn test_invalid_sort_direction() {
        let errors =
            build_with(&GatewayConfig::default(), json!({"sortBy": "name", "sortDirection": "UP"}))
                .unwrap_err();
        assert_eq!(
            errors.errors(),
            &[ParseError::InvalidSortDirection {
                value: "UP".to_string()
            }]
        );
    }

    #[test]
    fn test_query_with_nested_range_list() {
        let criteria = build(json!({
            "query": {
                "type": "multi",
                "operator": "AND",
                "queries": [
                    {"type": "equals", "field": "name", "value": "shirt"},
                    {
                        "type": "range",
                        "field": "price",
                        "parameters": [
                            {"operator": "gte", "value": 10},
                            {"operator": "lte", "value": 20}
                        ]
                    }
                ]
            }
        }));
        let FilterExpression::Multi { operator, queries } = &criteria.filters[0] else {
            panic!("expected multi filter");
        };
        assert_eq!(*operator, MultiOperator::And);
        assert_eq!(queries[0], FilterExpression::equals("product.name", "shirt"));
        assert!(matches!(&queries[1], FilterExpression::Range { parameters, .. } if parameters.len() == 2));
    }

    #[test]
    fn test_post_query_and_term() {
        let criteria = build(json!({
            "term": "blue shirt",
            "postQuery": {"type": "contains", "field": "name", "value": "blue"}
        }));
        assert_eq!(criteria.term.as_deref(), Some("blue shirt"));
        assert!(criteria.filters.is_empty());
        assert_eq!(criteria.post_filters.len(), 1);
    }

    #[test]
    fn test_errors_from_all_steps_are_reported_together() {
        let errors = build_with(
            &GatewayConfig::default(),
            json!({
                "query": {"type": "equals", "field": "id"},
                "aggregations": [{"type": "median", "field": "price", "name": "m"}]
            }),
        )
        .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors.errors()[0], ParseError::MalformedFilter { .. }));
        assert!(matches!(
            errors.errors()[1],
            ParseError::UnknownAggregationType { .. }
        ));
    }

    #[test]
    fn test_aggregations() {
        let criteria = build(json!({
            "aggregations": [
                {"type": "max", "field": "price", "name": "max_price"},
                {"type": "count", "field": "id", "name": "count_id", "groupByFields": ["name"]}
            ]
        }));
        let max = criteria.aggregation("max_price").unwrap();
        assert_eq!(max.kind, AggregationType::Max);
        assert_eq!(max.field, "product.price");
        let count = criteria.aggregation("count_id").unwrap();
        assert_eq!(count.group_by_fields, vec!["product.name"]);
    }

    #[test]
    fn test_duplicate_aggregation_name_last_wins() {
        let criteria = build(json!({
            "aggregations": [
                {"type": "min", "field": "price", "name": "p"},
                {"type": "max", "field": "price", "name": "p"}
            ]
        }));
        assert_eq!(criteria.aggregations().len(), 1);
        assert_eq!(criteria.aggregation("p").unwrap().kind, AggregationType::Max);
    }

    #[test]
    fn test_duplicate_aggregation_name_rejected_when_unique_names_enforced() {
        let config = GatewayConfig {
            unique_aggregation_names: true,
            ..GatewayConfig::default()
        };
        let errors = build_with(
            &config,
            json!({
                "aggregations": [
                    {"type": "min", "field": "price", "name": "p"},
                    {"type": "max", "field": "price", "name": "p"}
                ]
            }),
        )
        .unwrap_err();
        assert_eq!(
            errors.errors(),
            &[ParseError::DuplicateAggregationName {
                name: "p".to_string()
            }]
        );
    }
}
