//! Store-agnostic query description.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::aggregation::AggregationRequest;
use super::filter::FilterExpression;

/// How precisely the store should count the total result size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalCountMode {
    /// No total is computed
    #[default]
    None,
    /// Exact total, at the cost of a full count
    Exact,
    /// Only whether further pages exist
    NextPages,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("ASC"),
            SortDirection::Desc => f.write_str("DESC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSorting {
    pub field: String,
    pub direction: SortDirection,
}

impl FieldSorting {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Query handed to the entity store, including nested criteria for every
/// relation that has to be loaded alongside the main rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Criteria {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,
    /// Maximum rows; `None` means the store default
    pub limit: Option<u64>,
    /// Rows to skip; `None` means 0
    pub offset: Option<i64>,
    pub total_count_mode: TotalCountMode,
    pub sorting: Vec<FieldSorting>,
    pub filters: Vec<FilterExpression>,
    pub post_filters: Vec<FilterExpression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    aggregations: Vec<AggregationRequest>,
    associations: BTreeMap<String, Criteria>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Criteria selecting rows by primary key.
    pub fn with_ids(ids: Vec<String>) -> Self {
        Self {
            ids,
            ..Self::default()
        }
    }

    /// Offset the store should apply, treating `None` as 0.
    pub fn effective_offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }

    pub fn add_filter(&mut self, filter: FilterExpression) -> &mut Self {
        self.filters.push(filter);
        self
    }

    pub fn add_post_filter(&mut self, filter: FilterExpression) -> &mut Self {
        self.post_filters.push(filter);
        self
    }

    pub fn add_sorting(&mut self, sorting: FieldSorting) -> &mut Self {
        self.sorting.push(sorting);
        self
    }

    /// Adds an aggregation. An existing aggregation with the same name is
    /// replaced in place; returns `true` when that happened.
    pub fn add_aggregation(&mut self, aggregation: AggregationRequest) -> bool {
        match self
            .aggregations
            .iter_mut()
            .find(|existing| existing.name == aggregation.name)
        {
            Some(existing) => {
                *existing = aggregation;
                true
            }
            None => {
                self.aggregations.push(aggregation);
                false
            }
        }
    }

    pub fn aggregations(&self) -> &[AggregationRequest] {
        &self.aggregations
    }

    pub fn aggregation(&self, name: &str) -> Option<&AggregationRequest> {
        self.aggregations.iter().find(|a| a.name == name)
    }

    pub fn associations(&self) -> &BTreeMap<String, Criteria> {
        &self.associations
    }

    pub fn association(&self, name: &str) -> Option<&Criteria> {
        self.associations.get(name)
    }

    pub fn has_association(&self, name: &str) -> bool {
        self.associations.contains_key(name)
    }

    /// Returns the nested criteria for `name`, creating an empty one if needed.
    pub fn association_mut(&mut self, name: &str) -> &mut Criteria {
        self.associations.entry(name.to_string()).or_default()
    }

    /// Folds `nested` into the association entry for `name`.
    ///
    /// Pagination, term and count mode are taken from `nested`; filters,
    /// sorting and aggregations are appended; nested associations merge
    /// recursively.
    pub fn merge_association(&mut self, name: &str, nested: Criteria) {
        self.association_mut(name).absorb(nested);
    }

    fn absorb(&mut self, other: Criteria) {
        self.total_count_mode = other.total_count_mode;
        self.limit = other.limit;
        self.offset = other.offset;
        if other.term.is_some() {
            self.term = other.term;
        }
        self.ids.extend(other.ids);
        self.filters.extend(other.filters);
        self.post_filters.extend(other.post_filters);
        self.sorting.extend(other.sorting);
        for aggregation in other.aggregations {
            self.add_aggregation(aggregation);
        }
        for (name, nested) in other.associations {
            self.merge_association(&name, nested);
        }
    }
}
