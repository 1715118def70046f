use entity_graphql_core::{GraphQLError, ParseErrors, SchemaError};
use thiserror::Error;

use crate::store::StoreError;

/// Message shown to clients for every failure that is not an argument error.
pub const OPAQUE_MESSAGE: &str = "query resolution failed";

/// Any failure while resolving a root query or mutation field.
///
/// The full cause is kept for logs; [`client_message`](Self::client_message)
/// is what the caller should see.
#[derive(Error, Debug)]
pub enum QueryResolvingError {
    #[error(transparent)]
    GraphQL(#[from] GraphQLError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Mutation field without a create/update/delete prefix
    #[error("Mutation without valid action prefix called, got: '{name}'")]
    UnknownMutation { name: String },

    /// The customer entity was queried without a logged-in customer
    #[error("Customer is not logged in")]
    CustomerNotLoggedIn,

    /// Write succeeded but reported no primary key
    #[error("Write to '{entity}' returned no id")]
    NothingWritten { entity: String },

    #[error("Failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<ParseErrors> for QueryResolvingError {
    fn from(errors: ParseErrors) -> Self {
        QueryResolvingError::GraphQL(GraphQLError::Parse(errors))
    }
}

impl QueryResolvingError {
    /// The argument errors, when this failure was caused by the request arguments.
    pub fn parse_errors(&self) -> Option<&ParseErrors> {
        match self {
            QueryResolvingError::GraphQL(GraphQLError::Parse(errors)) => Some(errors),
            _ => None,
        }
    }

    pub fn is_parse_error(&self) -> bool {
        self.parse_errors().is_some()
    }

    pub fn client_message(&self) -> String {
        match self.parse_errors() {
            Some(errors) => errors.to_string(),
            None => OPAQUE_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity_graphql_core::ParseError;

    #[test]
    fn test_parse_errors_are_shown_to_clients() {
        let err = QueryResolvingError::from(ParseErrors::from(ParseError::InvalidSortDirection {
            value: "UP".to_string(),
        }));
        assert!(err.is_parse_error());
        assert_eq!(
            err.client_message(),
            "Invalid sort direction 'UP', expected ASC or DESC"
        );
    }

    #[test]
    fn test_internal_errors_are_opaque() {
        let err = QueryResolvingError::from(StoreError::Backend("connection reset".to_string()));
        assert!(!err.is_parse_error());
        assert_eq!(err.client_message(), OPAQUE_MESSAGE);
        assert!(err.to_string().contains("connection reset"));

        let err = QueryResolvingError::from(GraphQLError::UnknownAssociation {
            association: "name".to_string(),
            entity: "product".to_string(),
        });
        assert_eq!(err.client_message(), OPAQUE_MESSAGE);

        let err = QueryResolvingError::CustomerNotLoggedIn;
        assert!(!err.is_parse_error());
        assert_eq!(err.client_message(), OPAQUE_MESSAGE);
    }
}
