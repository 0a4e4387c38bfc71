//! Adapters for the two storage backends: the search index and the object store.

pub mod index;
pub mod object;
