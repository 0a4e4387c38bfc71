//! Search index adapter.
//!
//! A narrow contract over a document index: read by query, upsert by id, delete by query.
//! Errors are passed through as they come from the backend; nothing here retries.

use crate::domain::model::fields;
use crate::domain::query::SearchQuery;
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};

pub mod elasticsearch;
pub mod memory;

pub use elasticsearch::ElasticsearchIndex;
pub use memory::InMemoryIndex;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("index request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("index returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed index response: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Returns the `_source` of matching documents, in backend ranking order.
    ///
    /// No page size is requested, so an Elasticsearch backend returns at most its default
    /// of 10 hits.
    async fn read(&self, query: &SearchQuery, collection: &str)
        -> Result<Vec<JsonValue>, IndexError>;

    /// Upserts `document` under `id`.
    async fn write(&self, document: &JsonValue, collection: &str, id: &str)
        -> Result<(), IndexError>;

    /// Deletes every document matching `query` and returns how many were removed.
    async fn delete(&self, query: &SearchQuery, collection: &str) -> Result<u64, IndexError>;

    /// Creates `collection` with `mapping` unless it already exists.
    /// Returns `true` when the collection was created by this call.
    async fn ensure_collection(&self, collection: &str, mapping: &JsonValue)
        -> Result<bool, IndexError>;

    async fn ping(&self) -> Result<(), IndexError>;
}

/// Mapping of the `apps` collection.
///
/// `id` and `user` are exact-match keywords, `title` and `description` are analyzed text,
/// the remaining fields are stored but not searchable.
pub fn app_index_mapping() -> JsonValue {
    json!({
        "mappings": {
            "properties": {
                fields::ID:          { "type": "keyword" },
                fields::OWNER:       { "type": "keyword" },
                fields::TITLE:       { "type": "text" },
                fields::DESCRIPTION: { "type": "text" },
                fields::PRICE:       { "type": "keyword", "index": false },
                fields::MEDIA_URL:   { "type": "keyword", "index": false },
                fields::PRODUCT_REF: { "type": "keyword", "index": false },
                fields::PRICE_REF:   { "type": "keyword", "index": false }
            }
        }
    })
}
