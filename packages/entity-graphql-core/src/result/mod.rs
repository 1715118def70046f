//! Response side: store results into connections, cursors and buckets.

pub mod aggregation;
pub mod connection;
pub mod cursor;

pub use aggregation::{
    AggregationBucket, AggregationBucketSet, AggregationKey, AggregationResult,
    AggregationResultEntry, AggregationResultMapper, GroupEntry, MetricValue,
};
pub use connection::{Connection, Edge, PageInfo, SearchResult};
pub use cursor::{Cursor, CursorError};
