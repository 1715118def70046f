//! Attaches nested criteria for every relation a selection requests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::builder::CriteriaBuilder;
use super::criteria::Criteria;
use crate::config::GatewayConfig;
use crate::error::{GraphQLError, GraphQLResult};
use crate::schema::{EntitySchema, SchemaRegistry};

/// Connection and aggregation envelope fields that are not entity properties.
pub const TECHNICAL_FIELDS: [&str; 7] = [
    "edges",
    "node",
    "pageInfo",
    "aggregations",
    "results",
    "buckets",
    "keys",
];

pub fn is_technical_field(name: &str) -> bool {
    TECHNICAL_FIELDS.contains(&name)
}

/// Requested sub-fields keyed by field name.
pub type SelectionSet = BTreeMap<String, SelectionNode>;

/// One selected field with its arguments and sub-selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionNode {
    pub args: Map<String, Value>,
    pub fields: SelectionSet,
}

impl SelectionNode {
    pub fn new(args: Map<String, Value>, fields: SelectionSet) -> Self {
        Self { args, fields }
    }

    /// A selected field without arguments or sub-fields.
    pub fn leaf() -> Self {
        Self::default()
    }
}

pub struct AssociationPlanner<'a> {
    registry: &'a SchemaRegistry,
    config: &'a GatewayConfig,
    technical: fn(&str) -> bool,
}

impl<'a> AssociationPlanner<'a> {
    pub fn new(registry: &'a SchemaRegistry, config: &'a GatewayConfig) -> Self {
        Self {
            registry,
            config,
            technical: is_technical_field,
        }
    }

    /// Replaces the predicate deciding which field names are transparent wrappers.
    pub fn with_technical_fields(mut self, predicate: fn(&str) -> bool) -> Self {
        self.technical = predicate;
        self
    }

    /// Walks `selection` and merges nested criteria into `criteria` for every
    /// selected relation of `schema`.
    ///
    /// Fields without sub-selection are ignored. A selected field with
    /// sub-fields that is neither a technical wrapper nor a relation fails the
    /// whole walk.
    pub fn attach(
        &self,
        criteria: &mut Criteria,
        selection: &SelectionSet,
        schema: &EntitySchema,
    ) -> GraphQLResult<()> {
        self.walk(criteria, selection, schema, 1)
    }

    fn walk(
        &self,
        criteria: &mut Criteria,
        selection: &SelectionSet,
        schema: &EntitySchema,
        depth: usize,
    ) -> GraphQLResult<()> {
        if depth > self.config.max_selection_depth {
            return Err(GraphQLError::SelectionTooDeep {
                depth,
                max: self.config.max_selection_depth,
            });
        }

        for (name, node) in selection {
            if node.fields.is_empty() {
                continue;
            }

            if (self.technical)(name) && !schema.has_field(name) {
                self.walk(criteria, &node.fields, schema, depth + 1)?;
                continue;
            }

            let Some(reference) = schema
                .relation(name)
                .and_then(|field| field.kind.reference())
            else {
                return Err(GraphQLError::UnknownAssociation {
                    association: name.clone(),
                    entity: schema.entity_name().to_string(),
                });
            };

            let target = self.registry.get(reference)?;
            let mut nested = CriteriaBuilder::new(self.config).build(&node.args, &target)?;
            self.walk(&mut nested, &node.fields, &target, depth + 1)?;

            tracing::debug!(
                entity = schema.entity_name(),
                association = name.as_str(),
                target = target.entity_name(),
                "attached association"
            );
            criteria.merge_association(name, nested);
        }
        Ok(())
    }
}
