//! Typed search-index queries.
//!
//! Queries are built here and rendered into the Elasticsearch query DSL by [`SearchQuery::to_dsl`].
//! The in-memory index evaluates the same tree, so query branching can be tested without a cluster.

use crate::domain::model::fields;
use serde_json::{json, Value as JsonValue};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchQuery {
    /// Full-text match on an analyzed field. Every term must be present, and a query
    /// with no terms matches nothing.
    Match { field: String, text: String },
    /// Exact match on a non-analyzed field.
    Term { field: String, value: String },
    /// Conjunction: every sub-query must match.
    Bool { must: Vec<SearchQuery> },
}

impl SearchQuery {
    pub fn full_text(field: &str, text: &str) -> Self {
        SearchQuery::Match {
            field: field.to_string(),
            text: text.to_string(),
        }
    }

    pub fn exact(field: &str, value: &str) -> Self {
        SearchQuery::Term {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn all_of(must: Vec<SearchQuery>) -> Self {
        SearchQuery::Bool { must }
    }

    /// Discovery query for the `title` / `description` search inputs.
    ///
    /// An empty title searches the description only; an empty description searches the
    /// title only; otherwise both must match. Empty input on the chosen field matches nothing.
    pub fn discovery(title: &str, description: &str) -> Self {
        if title.is_empty() {
            return Self::full_text(fields::DESCRIPTION, description);
        }
        if description.is_empty() {
            return Self::full_text(fields::TITLE, title);
        }
        Self::all_of(vec![
            Self::full_text(fields::TITLE, title),
            Self::full_text(fields::DESCRIPTION, description),
        ])
    }

    pub fn by_id(id: &str) -> Self {
        Self::exact(fields::ID, id)
    }

    /// Retraction query: the document id AND its owner must both match exactly.
    pub fn owned_by(id: &str, owner: &str) -> Self {
        Self::all_of(vec![
            Self::exact(fields::ID, id),
            Self::exact(fields::OWNER, owner),
        ])
    }

    pub fn to_dsl(&self) -> JsonValue {
        match self {
            SearchQuery::Match { field, text } => json!({
                "match": {
                    field.as_str(): {
                        "query": text,
                        "operator": "and",
                        "zero_terms_query": "none"
                    }
                }
            }),
            SearchQuery::Term { field, value } => json!({
                "term": { field.as_str(): value }
            }),
            SearchQuery::Bool { must } => json!({
                "bool": {
                    "must": must.iter().map(SearchQuery::to_dsl).collect::<Vec<_>>()
                }
            }),
        }
    }
}
