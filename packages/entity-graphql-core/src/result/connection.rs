//! Relay-style connection envelope for search results.

use serde::Serialize;

use super::aggregation::{AggregationBucketSet, AggregationResult, AggregationResultMapper};
use super::cursor::Cursor;
use crate::query::Criteria;

/// Rows, total and raw aggregations returned by an entity store search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<T> {
    pub rows: Vec<T>,
    pub total: u64,
    pub aggregations: Vec<AggregationResult>,
}

impl<T> SearchResult<T> {
    pub fn new(rows: Vec<T>, total: u64) -> Self {
        Self {
            rows,
            total,
            aggregations: Vec::new(),
        }
    }

    pub fn with_aggregations(mut self, aggregations: Vec<AggregationResult>) -> Self {
        self.aggregations = aggregations;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge<T> {
    pub node: T,
    pub cursor: Cursor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    /// Row position of the first row; `None` when nothing matched
    pub start_cursor: Option<Cursor>,
    /// Row position of the last row; `None` when nothing matched
    pub end_cursor: Option<Cursor>,
}

impl PageInfo {
    /// Page information for the window `criteria` selects out of `total` rows.
    ///
    /// A missing limit means the whole result. `has_next_page` is true while
    /// the window ends at or before `total`. A negative offset starts the
    /// window at row 1.
    pub fn from_criteria(criteria: &Criteria, total: u64) -> Self {
        let total_rows = i64::try_from(total).unwrap_or(i64::MAX);
        let limit = criteria
            .limit
            .and_then(|limit| i64::try_from(limit).ok())
            .unwrap_or(total_rows);
        let offset = criteria.effective_offset();
        let end = limit.saturating_add(offset);

        let (start_cursor, end_cursor) = if total == 0 {
            (None, None)
        } else {
            (
                Some(position_cursor(offset.max(0).saturating_add(1))),
                Some(position_cursor(end)),
            )
        };

        PageInfo {
            has_next_page: total_rows >= end,
            has_previous_page: offset > 0,
            start_cursor,
            end_cursor,
        }
    }
}

fn position_cursor(position: i64) -> Cursor {
    Cursor::encode(u64::try_from(position).unwrap_or(0))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub total: u64,
    pub page_info: PageInfo,
    pub edges: Vec<Edge<T>>,
    pub aggregations: Vec<AggregationBucketSet>,
}

impl<T> Connection<T> {
    /// Wraps rows fetched with `criteria`. Each edge's cursor is the row's
    /// 1-based position in the overall result; rows before a negative offset
    /// do not exist, so numbering then starts at 1.
    pub fn assemble(
        rows: Vec<T>,
        total: u64,
        criteria: &Criteria,
        aggregations: Vec<AggregationResult>,
    ) -> Self {
        let offset = criteria.effective_offset().max(0);
        let edges = rows
            .into_iter()
            .zip(1i64..)
            .map(|(node, index)| Edge {
                node,
                cursor: position_cursor(offset.saturating_add(index)),
            })
            .collect();

        Connection {
            total,
            page_info: PageInfo::from_criteria(criteria, total),
            edges,
            aggregations: AggregationResultMapper::map_many(aggregations),
        }
    }

    pub fn from_search(result: SearchResult<T>, criteria: &Criteria) -> Self {
        Self::assemble(result.rows, result.total, criteria, result.aggregations)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|edge| &edge.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::cursor;
    use crate::result::MetricValue;
    use serde_json::{json, Value};

    fn window(limit: Option<u64>, offset: Option<i64>) -> Criteria {
        let mut criteria = Criteria::new();
        criteria.limit = limit;
        criteria.offset = offset;
        criteria
    }

    #[test]
    fn test_page_info_for_middle_page() {
        let info = PageInfo::from_criteria(&window(Some(10), Some(5)), 100);
        assert!(info.has_next_page);
        assert!(info.has_previous_page);
        assert_eq!(info.start_cursor, Some(Cursor::encode(6)));
        assert_eq!(info.end_cursor, Some(Cursor::encode(15)));
    }

    #[test]
    fn test_page_info_without_rows() {
        let info = PageInfo::from_criteria(&window(Some(10), None), 0);
        assert_eq!(info.start_cursor, None);
        assert_eq!(info.end_cursor, None);
        assert!(!info.has_previous_page);
    }

    #[test]
    fn test_page_info_without_limit_covers_everything() {
        let info = PageInfo::from_criteria(&Criteria::new(), 3);
        assert_eq!(info.start_cursor, Some(Cursor::encode(1)));
        assert_eq!(info.end_cursor, Some(Cursor::encode(3)));
        // the window ends exactly at the total, which counts as a next page
        assert!(info.has_next_page);
    }

    #[test]
    fn test_page_info_past_the_end() {
        let info = PageInfo::from_criteria(&window(Some(10), Some(95)), 100);
        assert!(!info.has_next_page);
    }

    #[test]
    fn test_edges_are_numbered_from_offset() {
        let connection = Connection::assemble(
            vec!["a", "b", "c"],
            50,
            &window(Some(3), Some(5)),
            Vec::new(),
        );
        let cursors: Vec<u64> = connection
            .edges
            .iter()
            .map(|edge| edge.cursor.decode())
            .collect();
        assert_eq!(cursors, vec![6, 7, 8]);
        assert_eq!(connection.nodes().copied().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_negative_offset_numbers_edges_from_row_one() {
        let connection = Connection::assemble(
            vec!["a", "b", "c"],
            20,
            &window(Some(5), Some(-2)),
            Vec::new(),
        );
        let cursors: Vec<u64> = connection
            .edges
            .iter()
            .map(|edge| edge.cursor.decode())
            .collect();
        assert_eq!(cursors, vec![1, 2, 3]);
        assert_eq!(connection.page_info.start_cursor, Some(Cursor::encode(1)));
        assert_eq!(connection.page_info.end_cursor, Some(Cursor::encode(3)));
        assert!(!connection.page_info.has_previous_page);
    }

    #[test]
    fn test_serialized_shape() {
        let connection = Connection::from_search(
            SearchResult::new(vec![json!({"id": "1"})], 1).with_aggregations(vec![
                AggregationResult::metric("n", MetricValue::Count(1)),
            ]),
            &window(Some(1), None),
        );
        let value: Value = serde_json::to_value(&connection).unwrap();
        assert_eq!(
            value,
            json!({
                "total": 1,
                "pageInfo": {
                    "hasNextPage": true,
                    "hasPreviousPage": false,
                    "startCursor": cursor::encode(1),
                    "endCursor": cursor::encode(1)
                },
                "edges": [{"node": {"id": "1"}, "cursor": cursor::encode(1)}],
                "aggregations": [{
                    "name": "n",
                    "buckets": [{"keys": [], "results": [{"type": "count", "result": 1}]}]
                }]
            })
        );
    }
}
