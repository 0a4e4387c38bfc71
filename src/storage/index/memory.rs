//! In-process [`SearchIndex`] used for local runs and tests.

use crate::domain::query::SearchQuery;
use crate::storage::index::{IndexError, SearchIndex};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Collections of `(key, document)` pairs kept in insertion order.
#[derive(Default)]
pub struct InMemoryIndex {
    collections: RwLock<HashMap<String, Vec<(String, JsonValue)>>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

/// Lowercased alphanumeric runs, a rough stand-in for the standard analyzer.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn matches(query: &SearchQuery, doc: &JsonValue) -> bool {
    match query {
        SearchQuery::Match { field, text } => {
            let wanted = tokenize(text);
            if wanted.is_empty() {
                return false;
            }
            let Some(stored) = doc.get(field).and_then(JsonValue::as_str) else {
                return false;
            };
            let present = tokenize(stored);
            wanted.iter().all(|t| present.contains(t))
        }
        SearchQuery::Term { field, value } => match doc.get(field) {
            Some(JsonValue::String(s)) => s == value,
            Some(JsonValue::Number(n)) => n.to_string() == *value,
            Some(JsonValue::Bool(b)) => b.to_string() == *value,
            _ => false,
        },
        SearchQuery::Bool { must } => must.iter().all(|q| matches(q, doc)),
    }
}

#[async_trait]
impl SearchIndex for InMemoryIndex {
    async fn read(
        &self,
        query: &SearchQuery,
        collection: &str,
    ) -> Result<Vec<JsonValue>, IndexError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| matches(query, doc))
                    .map(|(_, doc)| doc.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn write(
        &self,
        document: &JsonValue,
        collection: &str,
        id: &str,
    ) -> Result<(), IndexError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|(key, _)| key == id) {
            Some((_, existing)) => *existing = document.clone(),
            None => docs.push((id.to_string(), document.clone())),
        }
        Ok(())
    }

    async fn delete(&self, query: &SearchQuery, collection: &str) -> Result<u64, IndexError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|(_, doc)| !matches(query, doc));
        Ok((before - docs.len()) as u64)
    }

    async fn ensure_collection(
        &self,
        collection: &str,
        _mapping: &JsonValue,
    ) -> Result<bool, IndexError> {
        let mut collections = self.collections.write().await;
        if collections.contains_key(collection) {
            return Ok(false);
        }
        collections.insert(collection.to_string(), Vec::new());
        Ok(true)
    }

    async fn ping(&self) -> Result<(), IndexError> {
        Ok(())
    }
}
