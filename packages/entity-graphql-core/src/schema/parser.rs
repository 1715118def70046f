//! TOML schema documents.
//!
//! ```toml
//! [entities.product]
//! fields = [
//!     { name = "id", kind = "identifier", primary_key = true, required = true },
//!     { name = "name", kind = "text" },
//!     { name = "prices", kind = "one_to_many", reference = "product_price" },
//! ]
//! ```

use std::fs;
use std::path::Path;

use super::{EntitySchema, FieldDescriptor, FieldKind, SchemaRegistry};
use crate::error::SchemaError;

pub struct SchemaParser;

impl SchemaParser {
    pub fn from_file(path: impl AsRef<Path>) -> Result<SchemaRegistry, SchemaError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| SchemaError::Io(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_string(&content)
    }

    /// Parses a schema document and validates its relation references.
    pub fn from_string(toml_str: &str) -> Result<SchemaRegistry, SchemaError> {
        let document: toml::Value = toml::from_str(toml_str)
            .map_err(|e| SchemaError::Parse(format!("TOML parse error: {}", e)))?;

        let entities = document
            .get("entities")
            .and_then(|v| v.as_table())
            .ok_or_else(|| SchemaError::Parse("Missing [entities] section".into()))?;

        let mut registry = SchemaRegistry::new();
        for (entity_name, entity_config) in entities {
            let fields = Self::parse_field_list(entity_name, entity_config)?;
            registry.register(EntitySchema::new(entity_name.clone(), fields)?)?;
        }

        registry.validate()?;
        Ok(registry)
    }

    fn parse_field_list(
        entity: &str,
        config: &toml::Value,
    ) -> Result<Vec<FieldDescriptor>, SchemaError> {
        let field_array = config
            .get("fields")
            .and_then(|v| v.as_array())
            .ok_or_else(|| SchemaError::Parse(format!("Entity '{}' has no fields", entity)))?;

        let mut fields = Vec::with_capacity(field_array.len());
        for field_val in field_array {
            let name = field_val
                .get("name")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .ok_or_else(|| {
                    SchemaError::Parse(format!("Field on entity '{}' missing 'name'", entity))
                })?;

            let kind_str = field_val
                .get("kind")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    SchemaError::Parse(format!("Field '{}.{}' missing 'kind'", entity, name))
                })?;

            let reference = field_val
                .get("reference")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());

            let kind = Self::parse_kind(entity, &name, kind_str, reference)?;

            let required = field_val
                .get("required")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);

            let primary_key = field_val
                .get("primary_key")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);

            fields.push(FieldDescriptor {
                name,
                kind,
                required,
                primary_key,
            });
        }

        Ok(fields)
    }

    fn parse_kind(
        entity: &str,
        field: &str,
        kind: &str,
        reference: Option<String>,
    ) -> Result<FieldKind, SchemaError> {
        let relation = |build: fn(String) -> FieldKind| {
            reference
                .clone()
                .map(build)
                .ok_or_else(|| SchemaError::MissingReference {
                    entity: entity.to_string(),
                    field: field.to_string(),
                })
        };

        match kind {
            "scalar" => Ok(FieldKind::Scalar),
            "identifier" => Ok(FieldKind::Identifier),
            "boolean" => Ok(FieldKind::Boolean),
            "date" => Ok(FieldKind::Date),
            "numeric" => Ok(FieldKind::Numeric),
            "text" => Ok(FieldKind::Text),
            "structural" => Ok(FieldKind::Structural),
            "many_to_many" => relation(|reference| FieldKind::ManyToMany { reference }),
            "one_to_many" => relation(|reference| FieldKind::OneToMany { reference }),
            "many_to_one" => relation(|reference| FieldKind::ManyToOne { reference }),
            "one_to_one" => relation(|reference| FieldKind::OneToOne { reference }),
            other => Err(SchemaError::UnknownFieldKind {
                entity: entity.to_string(),
                field: field.to_string(),
                kind: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
[entities.product]
fields = [
    { name = "id", kind = "identifier", primary_key = true, required = true },
    { name = "name", kind = "text", required = true },
    { name = "stock", kind = "numeric" },
    { name = "prices", kind = "one_to_many", reference = "product_price" },
]

[entities.product_price]
fields = [
    { name = "id", kind = "identifier", primary_key = true },
    { name = "price", kind = "numeric" },
    { name = "product", kind = "many_to_one", reference = "product" },
]
"#;

    #[test]
    fn test_parse_catalog() {
        let registry = SchemaParser::from_string(CATALOG).unwrap();
        assert_eq!(registry.entity_names(), vec!["product", "product_price"]);

        let product = registry.get("product").unwrap();
        assert_eq!(product.fields().len(), 4);
        assert!(product.field("name").unwrap().required);
        assert_eq!(
            product.relation("prices").unwrap().kind,
            FieldKind::OneToMany {
                reference: "product_price".to_string()
            }
        );
    }

    #[test]
    fn test_relation_without_reference() {
        let doc = r#"
[entities.product]
fields = [{ name = "prices", kind = "one_to_many" }]
"#;
        assert_eq!(
            SchemaParser::from_string(doc).unwrap_err(),
            SchemaError::MissingReference {
                entity: "product".to_string(),
                field: "prices".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_kind() {
        let doc = r#"
[entities.product]
fields = [{ name = "blob", kind = "binary" }]
"#;
        assert!(matches!(
            SchemaParser::from_string(doc),
            Err(SchemaError::UnknownFieldKind { kind, .. }) if kind == "binary"
        ));
    }

    #[test]
    fn test_dangling_reference_is_rejected() {
        let doc = r#"
[entities.product]
fields = [{ name = "tax", kind = "many_to_one", reference = "tax" }]
"#;
        assert!(matches!(
            SchemaParser::from_string(doc),
            Err(SchemaError::DanglingReference { .. })
        ));
    }

    #[test]
    fn test_missing_entities_section() {
        assert!(matches!(
            SchemaParser::from_string("[database]\nname = \"shop\"\n"),
            Err(SchemaError::Parse(_))
        ));
    }
}
