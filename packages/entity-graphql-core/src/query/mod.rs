//! Request side: GraphQL arguments and selections into store criteria.

pub mod aggregation;
pub mod association;
pub mod builder;
pub mod criteria;
pub mod filter;

pub use aggregation::{AggregationParser, AggregationRequest, AggregationType};
pub use association::{
    is_technical_field, AssociationPlanner, SelectionNode, SelectionSet, TECHNICAL_FIELDS,
};
pub use builder::CriteriaBuilder;
pub use criteria::{Criteria, FieldSorting, SortDirection, TotalCountMode};
pub use filter::{
    normalize_range_parameters, parse_filter, FilterExpression, FilterParser, MultiOperator,
    RangeOperator, EQUALS_ANY_DELIMITER,
};
