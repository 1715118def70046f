//! Translation core for exposing entity stores over GraphQL.
//!
//! Turns field arguments and selection trees into store [`Criteria`], and
//! store results back into Relay connections with cursors and aggregation
//! buckets. Nothing here performs I/O besides loading schema and config files.

pub mod config;
pub mod error;
pub mod query;
pub mod result;
pub mod schema;

pub use config::GatewayConfig;
pub use error::{GraphQLError, GraphQLResult, ParseError, ParseErrors, SchemaError};
pub use query::{AssociationPlanner, Criteria, CriteriaBuilder, SelectionNode, SelectionSet};
pub use result::{Connection, Cursor, SearchResult};
pub use schema::{EntitySchema, FieldDescriptor, FieldKind, SchemaRegistry};
