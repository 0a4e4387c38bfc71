//! In-process [`ObjectStore`] used for local runs and tests.

use crate::storage::object::{MediaStream, ObjectStore, StorageError};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::TryStreamExt;
use std::collections::HashMap;
use tokio::sync::Mutex;

pub struct InMemoryObjectStore {
    public_base_url: String,
    objects: Mutex<HashMap<String, Bytes>>,
}

impl InMemoryObjectStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, name: &str) -> Option<Bytes> {
        self.objects.lock().await.get(name).cloned()
    }

    pub async fn object_count(&self) -> usize {
        self.objects.lock().await.len()
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new("memory://media")
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn upload(&self, name: &str, media: MediaStream) -> Result<String, StorageError> {
        // Drain the whole stream before storing; a read error leaves nothing behind.
        let data = media
            .try_fold(BytesMut::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await?;

        self.objects
            .lock()
            .await
            .insert(name.to_string(), data.freeze());
        Ok(format!("{}/{}", self.public_base_url, name))
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
