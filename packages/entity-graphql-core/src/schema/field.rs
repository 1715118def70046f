//! Field definition within an entity schema.

use serde::Serialize;

/// What a field holds. Relation kinds carry the name of the entity they point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Scalar,
    Identifier,
    Boolean,
    Date,
    Numeric,
    Text,
    ManyToMany { reference: String },
    OneToMany { reference: String },
    ManyToOne { reference: String },
    OneToOne { reference: String },
    /// Storage-level field that is not exposed through GraphQL
    Structural,
}

impl FieldKind {
    /// Target entity name for relation kinds.
    pub fn reference(&self) -> Option<&str> {
        match self {
            FieldKind::ManyToMany { reference }
            | FieldKind::OneToMany { reference }
            | FieldKind::ManyToOne { reference }
            | FieldKind::OneToOne { reference } => Some(reference),
            FieldKind::Scalar
            | FieldKind::Identifier
            | FieldKind::Boolean
            | FieldKind::Date
            | FieldKind::Numeric
            | FieldKind::Text
            | FieldKind::Structural => None,
        }
    }

    pub fn is_relation(&self) -> bool {
        self.reference().is_some()
    }

    /// Relations that resolve to a list of rows.
    pub fn is_to_many(&self) -> bool {
        matches!(
            self,
            FieldKind::ManyToMany { .. } | FieldKind::OneToMany { .. }
        )
    }

    /// Tag used in schema documents.
    pub fn tag(&self) -> &'static str {
        match self {
            FieldKind::Scalar => "scalar",
            FieldKind::Identifier => "identifier",
            FieldKind::Boolean => "boolean",
            FieldKind::Date => "date",
            FieldKind::Numeric => "numeric",
            FieldKind::Text => "text",
            FieldKind::ManyToMany { .. } => "many_to_many",
            FieldKind::OneToMany { .. } => "one_to_many",
            FieldKind::ManyToOne { .. } => "many_to_one",
            FieldKind::OneToOne { .. } => "one_to_one",
            FieldKind::Structural => "structural",
        }
    }
}

/// A single property of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    /// Property name, unique within its entity
    pub name: String,
    /// Field kind
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Whether a value is mandatory on write
    pub required: bool,
    /// Whether this field is (part of) the primary key
    pub primary_key: bool,
}

impl FieldDescriptor {
    /// Creates an optional, non-key field.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            primary_key: false,
        }
    }

    /// Creates a required primary-key identifier field.
    pub fn id(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Identifier,
            required: true,
            primary_key: true,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn is_relation(&self) -> bool {
        self.kind.is_relation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_kinds_expose_reference() {
        let kinds = [
            FieldKind::ManyToMany {
                reference: "category".to_string(),
            },
            FieldKind::OneToMany {
                reference: "category".to_string(),
            },
            FieldKind::ManyToOne {
                reference: "category".to_string(),
            },
            FieldKind::OneToOne {
                reference: "category".to_string(),
            },
        ];
        for kind in kinds {
            assert!(kind.is_relation());
            assert_eq!(kind.reference(), Some("category"));
        }
    }

    #[test]
    fn test_plain_kinds_are_not_relations() {
        for kind in [
            FieldKind::Scalar,
            FieldKind::Identifier,
            FieldKind::Boolean,
            FieldKind::Date,
            FieldKind::Numeric,
            FieldKind::Text,
            FieldKind::Structural,
        ] {
            assert!(!kind.is_relation());
            assert!(!kind.is_to_many());
        }
    }

    #[test]
    fn test_id_field_is_required_primary_key() {
        let field = FieldDescriptor::id("id");
        assert!(field.required);
        assert!(field.primary_key);
        assert_eq!(field.kind, FieldKind::Identifier);
    }
}
