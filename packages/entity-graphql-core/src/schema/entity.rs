//! Entity schema: a named, immutable set of field descriptors.

use std::collections::HashSet;

use serde::Serialize;

use super::field::FieldDescriptor;
use crate::error::SchemaError;

/// Field schema of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySchema {
    entity_name: String,
    fields: Vec<FieldDescriptor>,
}

impl EntitySchema {
    /// Creates a schema, rejecting duplicate property names.
    ///
    /// # Arguments
    /// * `entity_name` - Entity name used to qualify field paths
    /// * `fields` - Field descriptors in declaration order
    pub fn new(
        entity_name: impl Into<String>,
        fields: Vec<FieldDescriptor>,
    ) -> Result<Self, SchemaError> {
        let entity_name = entity_name.into();
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    entity: entity_name,
                    field: field.name.clone(),
                });
            }
        }
        Ok(Self {
            entity_name,
            fields,
        })
    }

    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// The first primary-key field, if any.
    pub fn primary_key(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.primary_key)
    }

    /// Looks up a relation field by property name. Non-relation fields return `None`.
    pub fn relation(&self, name: &str) -> Option<&FieldDescriptor> {
        self.field(name).filter(|field| field.is_relation())
    }

    pub fn relations(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|field| field.is_relation())
    }

    /// Prefixes a schema-relative property path with the entity name.
    /// Paths that are already qualified are returned unchanged.
    pub fn qualify(&self, path: &str) -> String {
        let already_qualified = path
            .strip_prefix(self.entity_name.as_str())
            .is_some_and(|rest| rest.starts_with('.'));
        if already_qualified {
            path.to_string()
        } else {
            format!("{}.{}", self.entity_name, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldKind;

    fn product() -> EntitySchema {
        EntitySchema::new(
            "product",
            vec![
                FieldDescriptor::id("id"),
                FieldDescriptor::new("name", FieldKind::Text).required(),
                FieldDescriptor::new(
                    "manufacturer",
                    FieldKind::ManyToOne {
                        reference: "product_manufacturer".to_string(),
                    },
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = EntitySchema::new(
            "product",
            vec![
                FieldDescriptor::id("id"),
                FieldDescriptor::new("id", FieldKind::Text),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateField {
                entity: "product".to_string(),
                field: "id".to_string(),
            }
        );
    }

    #[test]
    fn test_relation_lookup_ignores_plain_fields() {
        let schema = product();
        assert!(schema.relation("manufacturer").is_some());
        assert!(schema.relation("name").is_none());
        assert!(schema.relation("missing").is_none());
        assert_eq!(schema.relations().count(), 1);
        assert_eq!(schema.primary_key().map(|f| f.name.as_str()), Some("id"));
    }

    #[test]
    fn test_qualify() {
        let schema = product();
        assert_eq!(schema.qualify("id"), "product.id");
        assert_eq!(schema.qualify("manufacturer.name"), "product.manufacturer.name");
        assert_eq!(schema.qualify("product.id"), "product.id");
        // a field that merely starts with the entity name is still prefixed
        assert_eq!(schema.qualify("productNumber"), "product.productNumber");
    }
}
