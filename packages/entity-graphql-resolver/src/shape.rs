//! Turns nested to-many rows returned by the store into connections.

use entity_graphql_core::query::is_technical_field;
use entity_graphql_core::{Connection, Criteria, EntitySchema, SchemaRegistry, SelectionSet};
use serde_json::{Map, Value};

use crate::error::QueryResolvingError;

/// Walks a row along the selection and replaces every selected to-many
/// relation array with a connection over its rows.
///
/// Edge cursors of a nested connection follow the association's own window;
/// its total is the number of rows the store returned for it.
pub(crate) struct RowShaper<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> RowShaper<'a> {
    pub(crate) fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    pub(crate) fn shape(
        &self,
        row: &mut Value,
        selection: &SelectionSet,
        schema: &EntitySchema,
        criteria: &Criteria,
    ) -> Result<(), QueryResolvingError> {
        if let Value::Object(object) = row {
            self.shape_object(object, selection, schema, criteria)?;
        }
        Ok(())
    }

    fn shape_object(
        &self,
        object: &mut Map<String, Value>,
        selection: &SelectionSet,
        schema: &EntitySchema,
        criteria: &Criteria,
    ) -> Result<(), QueryResolvingError> {
        for (name, node) in selection {
            if node.fields.is_empty() {
                continue;
            }

            // edges/node wrappers select fields of the row itself
            if is_technical_field(name) && !schema.has_field(name) {
                self.shape_object(object, &node.fields, schema, criteria)?;
                continue;
            }

            let Some(field) = schema.relation(name) else {
                continue;
            };
            let Some(reference) = field.kind.reference() else {
                continue;
            };
            let Some(value) = object.get_mut(name) else {
                continue;
            };

            let target = self.registry.get(reference)?;
            let unrestricted = Criteria::new();
            let nested = criteria.association(name).unwrap_or(&unrestricted);

            if !field.kind.is_to_many() {
                self.shape(value, &node.fields, &target, nested)?;
                continue;
            }

            match std::mem::take(value) {
                Value::Array(mut rows) => {
                    for row in &mut rows {
                        self.shape(row, &node.fields, &target, nested)?;
                    }
                    let total = rows.len() as u64;
                    *value = serde_json::to_value(Connection::assemble(
                        rows,
                        total,
                        nested,
                        Vec::new(),
                    ))?;
                }
                other => *value = other,
            }
        }
        Ok(())
    }
}
