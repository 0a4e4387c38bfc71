//! Object store adapter.
//!
//! Uploads a media stream under a given name, makes it publicly readable and returns its
//! public URL. A failed upload returns no reference and leaves any partial object in place.

use async_trait::async_trait;
use bytes::Bytes;
use futures::future;
use futures::stream::{self, Stream};
use std::pin::Pin;

pub mod gcs;
pub mod memory;

pub use gcs::GcsObjectStore;
pub use memory::InMemoryObjectStore;

/// Media payload handed to [`ObjectStore::upload`]. The store takes ownership of the stream.
pub type MediaStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send + Sync + 'static>>;

pub fn media_from_bytes(bytes: impl Into<Bytes>) -> MediaStream {
    Box::pin(stream::once(future::ready(Ok::<_, std::io::Error>(bytes.into()))))
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("object store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("object store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("reading media stream failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed object store response: {0}")]
    MalformedResponse(String),

    #[error("cannot build object URL from base '{0}'")]
    InvalidObjectUrl(String),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `media` as object `name` with public-read access and returns its public URL.
    async fn upload(&self, name: &str, media: MediaStream) -> Result<String, StorageError>;

    async fn ping(&self) -> Result<(), StorageError>;
}
