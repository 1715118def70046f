//! Registry of entity schemas keyed by entity name.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::entity::EntitySchema;
use crate::error::SchemaError;

/// Owns every known entity schema. Schemas are immutable once registered.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Arc<EntitySchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema under its entity name.
    pub fn register(&mut self, schema: EntitySchema) -> Result<Arc<EntitySchema>, SchemaError> {
        let name = schema.entity_name().to_string();
        if self.schemas.contains_key(&name) {
            return Err(SchemaError::EntityAlreadyExists { entity: name });
        }
        let schema = Arc::new(schema);
        self.schemas.insert(name, Arc::clone(&schema));
        Ok(schema)
    }

    pub fn get(&self, entity: &str) -> Result<Arc<EntitySchema>, SchemaError> {
        self.schemas
            .get(entity)
            .cloned()
            .ok_or_else(|| SchemaError::EntityNotFound {
                entity: entity.to_string(),
            })
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.schemas.contains_key(entity)
    }

    /// Entity names in sorted order.
    pub fn entity_names(&self) -> Vec<String> {
        self.schemas.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<EntitySchema>> {
        self.schemas.values()
    }

    /// Checks that every relation points at a registered entity.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for schema in self.schemas.values() {
            for field in schema.relations() {
                let Some(reference) = field.kind.reference() else {
                    continue;
                };
                if !self.schemas.contains_key(reference) {
                    return Err(SchemaError::DanglingReference {
                        entity: schema.entity_name().to_string(),
                        field: field.name.clone(),
                        reference: reference.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
