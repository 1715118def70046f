//! The entity store the resolver reads from and writes to.

use entity_graphql_core::{Criteria, EntitySchema, SearchResult};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::context::RequestContext;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No storage is registered for the entity
    #[error("No repository registered for entity '{entity}'")]
    RepositoryNotFound { entity: String },

    /// The store refused a write payload
    #[error("Write to '{entity}' rejected: {reason}")]
    Rejected { entity: String, reason: String },

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Primary keys touched by a write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteResult {
    pub ids: Vec<String>,
}

impl WriteResult {
    pub fn new(ids: Vec<String>) -> Self {
        Self { ids }
    }

    pub fn first_id(&self) -> Option<&str> {
        self.ids.first().map(String::as_str)
    }
}

/// Executes criteria and writes against some persistent entity storage.
///
/// Implementations resolve the criteria's nested associations as part of the
/// same search, so one call returns rows with their requested relations.
/// Selected to-many relations come back as plain arrays of rows. Every call
/// carries the request's [`RequestContext`].
pub trait EntityStore {
    fn search(
        &self,
        criteria: &Criteria,
        schema: &EntitySchema,
        context: &RequestContext,
    ) -> Result<SearchResult<Value>, StoreError>;

    fn create(
        &self,
        payload: &Map<String, Value>,
        schema: &EntitySchema,
        context: &RequestContext,
    ) -> Result<WriteResult, StoreError>;

    fn update(
        &self,
        payload: &Map<String, Value>,
        schema: &EntitySchema,
        context: &RequestContext,
    ) -> Result<WriteResult, StoreError>;

    fn delete(
        &self,
        payload: &Map<String, Value>,
        schema: &EntitySchema,
        context: &RequestContext,
    ) -> Result<WriteResult, StoreError>;
}
