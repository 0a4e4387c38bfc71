//! Domain model for published apps.
//!
//! An [`App`] is the metadata record of a downloadable digital good. It is built in memory
//! from a validated [`PublishRequest`], enriched with the payment gateway references and the
//! stored media URL, and only then written to the search index.

pub mod app;
pub mod publish;

pub use app::{fields, App};
pub use publish::PublishRequest;

/// Errors raised by the domain model itself (input validation and set-once references).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("owner must not be empty")]
    EmptyOwner,

    #[error("price '{0}' is not a non-negative integer")]
    InvalidPrice(String),

    #[error("{field} is already set on app {id}")]
    ReferenceAlreadySet { id: String, field: &'static str },
}
