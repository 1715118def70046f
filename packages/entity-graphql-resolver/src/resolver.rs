//! Root field resolution: one query or mutation field against the store.

use std::sync::Arc;

use entity_graphql_core::query::FilterExpression;
use entity_graphql_core::{
    AssociationPlanner, Connection, Criteria, CriteriaBuilder, EntitySchema, GatewayConfig,
    SchemaRegistry, SearchResult, SelectionSet,
};
use serde_json::{Map, Value};

use crate::context::{RequestContext, CUSTOMER_ENTITY, SALES_CHANNEL_ENTITY};
use crate::error::QueryResolvingError;
use crate::mutation::{Mutation, MutationAction};
use crate::naming::Inflector;
use crate::shape::RowShaper;
use crate::store::EntityStore;

pub struct QueryResolver<S> {
    registry: Arc<SchemaRegistry>,
    store: S,
    inflector: Inflector,
    config: GatewayConfig,
}

impl<S: EntityStore> QueryResolver<S> {
    pub fn new(registry: Arc<SchemaRegistry>, store: S, config: GatewayConfig) -> Self {
        Self {
            registry,
            store,
            inflector: Inflector::default(),
            config,
        }
    }

    pub fn with_inflector(mut self, inflector: Inflector) -> Self {
        self.inflector = inflector;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolves a root query field.
    ///
    /// A plural field (`products`) returns a connection, a singular one
    /// (`product`) the first matching row or `null`. Selected to-many
    /// relations inside the rows are returned as connections too.
    ///
    /// The `customer` entity only yields the logged-in customer. Other
    /// entities related to sales channels are limited to the context's
    /// channel when it has one.
    pub fn resolve_query(
        &self,
        field: &str,
        args: &Map<String, Value>,
        selection: &SelectionSet,
        context: &RequestContext,
    ) -> Result<Value, QueryResolvingError> {
        self.query(field, args, selection, context)
            .inspect_err(|e| report(field, e))
    }

    /// Resolves a root mutation field such as `createProduct`.
    ///
    /// Create and update return the written row re-read with the selected
    /// associations; delete returns the deleted id.
    pub fn resolve_mutation(
        &self,
        field: &str,
        args: &Map<String, Value>,
        selection: &SelectionSet,
        context: &RequestContext,
    ) -> Result<Value, QueryResolvingError> {
        self.mutate(field, args, selection, context)
            .inspect_err(|e| report(field, e))
    }

    fn query(
        &self,
        field: &str,
        args: &Map<String, Value>,
        selection: &SelectionSet,
        context: &RequestContext,
    ) -> Result<Value, QueryResolvingError> {
        let singular = self.inflector.singularize(field);
        let schema = self.registry.get(&self.inflector.tableize(&singular))?;

        let mut criteria = CriteriaBuilder::new(&self.config).build(args, &schema)?;
        self.planner().attach(&mut criteria, selection, &schema)?;
        scope(&mut criteria, &schema, context)?;

        let mut result = self.store.search(&criteria, &schema, context)?;
        tracing::debug!(
            field,
            entity = schema.entity_name(),
            rows = result.rows.len(),
            total = result.total,
            "resolved query"
        );

        let shaper = RowShaper::new(&self.registry);
        for row in &mut result.rows {
            shaper.shape(row, selection, &schema, &criteria)?;
        }

        if singular != field {
            Ok(serde_json::to_value(Connection::from_search(result, &criteria))?)
        } else {
            Ok(first_row(result))
        }
    }

    fn mutate(
        &self,
        field: &str,
        args: &Map<String, Value>,
        selection: &SelectionSet,
        context: &RequestContext,
    ) -> Result<Value, QueryResolvingError> {
        let mutation = Mutation::from_name(field, &self.inflector)?;
        let schema = self.registry.get(mutation.entity_name())?;

        let written = match mutation.action() {
            MutationAction::Create => self.store.create(args, &schema, context)?,
            MutationAction::Update => self.store.update(args, &schema, context)?,
            MutationAction::Delete => self.store.delete(args, &schema, context)?,
        };
        let id = written
            .first_id()
            .ok_or_else(|| QueryResolvingError::NothingWritten {
                entity: schema.entity_name().to_string(),
            })?
            .to_string();

        tracing::debug!(
            field,
            action = %mutation.action(),
            entity = schema.entity_name(),
            id = id.as_str(),
            "applied mutation"
        );

        if mutation.action() == MutationAction::Delete {
            return Ok(Value::String(id));
        }
        self.reread(id, selection, &schema, context)
    }

    fn reread(
        &self,
        id: String,
        selection: &SelectionSet,
        schema: &EntitySchema,
        context: &RequestContext,
    ) -> Result<Value, QueryResolvingError> {
        let mut criteria = Criteria::with_ids(vec![id]);
        self.planner().attach(&mut criteria, selection, schema)?;
        let mut row = first_row(self.store.search(&criteria, schema, context)?);
        RowShaper::new(&self.registry).shape(&mut row, selection, schema, &criteria)?;
        Ok(row)
    }

    fn planner(&self) -> AssociationPlanner<'_> {
        AssociationPlanner::new(&self.registry, &self.config)
    }
}

/// Restricts a root query to what the request may see.
fn scope(
    criteria: &mut Criteria,
    schema: &EntitySchema,
    context: &RequestContext,
) -> Result<(), QueryResolvingError> {
    if schema.entity_name() == CUSTOMER_ENTITY {
        let customer = context
            .customer_id
            .as_deref()
            .ok_or(QueryResolvingError::CustomerNotLoggedIn)?;
        criteria.add_filter(FilterExpression::equals(schema.qualify("id"), customer));
        return Ok(());
    }

    let Some(channel) = context.sales_channel_id.as_deref() else {
        return Ok(());
    };
    for relation in schema.relations() {
        if relation.kind.is_to_many() && relation.kind.reference() == Some(SALES_CHANNEL_ENTITY) {
            criteria.add_filter(FilterExpression::equals(
                schema.qualify(&format!("{}.id", relation.name)),
                channel,
            ));
        }
    }
    Ok(())
}

fn first_row(result: SearchResult<Value>) -> Value {
    result.rows.into_iter().next().unwrap_or(Value::Null)
}

fn report(field: &str, error: &QueryResolvingError) {
    if error.is_parse_error() {
        tracing::debug!(field, error = %error, "rejected field arguments");
    } else {
        tracing::error!(field, error = %error, "query resolution failed");
    }
}
