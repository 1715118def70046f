//! Error types for criteria translation.

use std::fmt;

use thiserror::Error;

/// A single recoverable problem found while parsing request arguments.
///
/// These are collected across a whole request and reported together.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Filter node with a missing or unusable parameter
    #[error("Malformed filter at '{path}': {reason}")]
    MalformedFilter { path: String, reason: String },

    /// Aggregation `type` outside avg|min|max|sum|count|stats
    #[error("Unknown aggregation type '{kind}' at '{path}'")]
    UnknownAggregationType { path: String, kind: String },

    /// Aggregation without one of its required keys
    #[error("Parameter '{parameter}' for aggregation at '{path}' is missing")]
    MissingAggregationParameter { path: String, parameter: String },

    /// Two sibling aggregations share a name (only when uniqueness is enforced)
    #[error("Aggregation name '{name}' is used more than once")]
    DuplicateAggregationName { name: String },

    /// `first`/`last` not a non-negative integer
    #[error("Invalid pagination argument '{argument}': {reason}")]
    InvalidPagination { argument: String, reason: String },

    /// `sortDirection` other than ASC/DESC
    #[error("Invalid sort direction '{value}', expected ASC or DESC")]
    InvalidSortDirection { value: String },

    /// Undecodable cursor (only when strict cursors are enabled)
    #[error("Cursor passed as '{argument}' could not be decoded")]
    InvalidCursor { argument: String },
}

/// Every parse problem found in one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrors(Vec<ParseError>);

impl ParseErrors {
    pub fn errors(&self) -> &[ParseError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<ParseError> {
        self.0
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

impl From<ParseError> for ParseErrors {
    fn from(error: ParseError) -> Self {
        ParseErrors(vec![error])
    }
}

/// Accumulates parse errors so a request reports all of them at once.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: Vec<ParseError>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Shorthand for [`ParseError::MalformedFilter`].
    pub fn malformed(&mut self, path: &str, reason: impl Into<String>) {
        self.push(ParseError::MalformedFilter {
            path: path.to_string(),
            reason: reason.into(),
        });
    }

    /// Returns `Err` carrying everything collected, or `Ok` if nothing was.
    pub fn finish(self) -> Result<(), ParseErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ParseErrors(self.errors))
        }
    }
}

/// Schema construction and lookup errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Property name declared twice
    #[error("Field '{field}' declared more than once on entity '{entity}'")]
    DuplicateField { entity: String, field: String },

    /// Entity not registered
    #[error("Entity '{entity}' not found")]
    EntityNotFound { entity: String },

    /// Entity registered twice
    #[error("Entity '{entity}' already registered")]
    EntityAlreadyExists { entity: String },

    /// Field kind tag not recognized by the schema parser
    #[error("Unknown kind '{kind}' for field '{field}' on entity '{entity}'")]
    UnknownFieldKind {
        entity: String,
        field: String,
        kind: String,
    },

    /// Relation field declared without a target entity
    #[error("Relation field '{field}' on entity '{entity}' has no reference")]
    MissingReference { entity: String, field: String },

    /// Relation pointing at an entity that is not registered
    #[error("Relation '{entity}.{field}' references unknown entity '{reference}'")]
    DanglingReference {
        entity: String,
        field: String,
        reference: String,
    },

    /// Malformed schema document
    #[error("Schema parse error: {0}")]
    Parse(String),

    /// Schema file could not be read
    #[error("I/O error: {0}")]
    Io(String),
}

/// Errors raised while turning a request into criteria.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphQLError {
    /// One or more recoverable argument errors
    #[error("{0}")]
    Parse(#[from] ParseErrors),

    /// Selection names a field that is not a relation of the entity
    #[error("Association '{association}' on entity '{entity}' not found")]
    UnknownAssociation { association: String, entity: String },

    /// Selection nested deeper than the configured limit
    #[error("Selection depth {depth} exceeds the maximum of {max}")]
    SelectionTooDeep { depth: usize, max: usize },

    /// Schema lookup failed during traversal
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl GraphQLError {
    /// True for errors caused by the caller's arguments.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, GraphQLError::Parse(_))
    }
}

pub type GraphQLResult<T> = Result<T, GraphQLError>;
