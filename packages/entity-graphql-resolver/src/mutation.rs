//! Mutation field names: `<action><EntityName>`.

use std::fmt;

use crate::error::QueryResolvingError;
use crate::naming::Inflector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationAction {
    Create,
    Update,
    Delete,
}

impl MutationAction {
    pub const ALL: [MutationAction; 3] = [
        MutationAction::Create,
        MutationAction::Update,
        MutationAction::Delete,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            MutationAction::Create => "create",
            MutationAction::Update => "update",
            MutationAction::Delete => "delete",
        }
    }
}

impl fmt::Display for MutationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    action: MutationAction,
    entity_name: String,
}

impl Mutation {
    pub fn new(action: MutationAction, entity_name: impl Into<String>) -> Self {
        Self {
            action,
            entity_name: entity_name.into(),
        }
    }

    /// Parses `createProductPrice` into `Create` on `product_price`.
    pub fn from_name(name: &str, inflector: &Inflector) -> Result<Self, QueryResolvingError> {
        MutationAction::ALL
            .iter()
            .find_map(|action| {
                let entity = name.strip_prefix(action.prefix())?;
                (!entity.is_empty()).then(|| Mutation::new(*action, inflector.tableize(entity)))
            })
            .ok_or_else(|| QueryResolvingError::UnknownMutation {
                name: name.to_string(),
            })
    }

    pub fn action(&self) -> MutationAction {
        self.action
    }

    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// Field name for this mutation, the inverse of [`Mutation::from_name`].
    pub fn name(&self, inflector: &Inflector) -> String {
        format!("{}{}", self.action, inflector.classify(&self.entity_name))
    }
}
