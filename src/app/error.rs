//! Fault kinds reported by [`AppService`](crate::app::AppService).

use crate::domain::model::ModelError;
use crate::infra::payment::PaymentError;
use crate::storage::index::IndexError;
use crate::storage::object::StorageError;
use std::fmt;

/// The external call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CreateProduct,
    UploadMedia,
    IndexApp,
    Search,
    Lookup,
    CreateCheckout,
    Retract,
    EnsureIndex,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::CreateProduct => "create product and price",
            Stage::UploadMedia => "upload media",
            Stage::IndexApp => "index app",
            Stage::Search => "search apps",
            Stage::Lookup => "look up app",
            Stage::CreateCheckout => "create checkout session",
            Stage::Retract => "retract app",
            Stage::EnsureIndex => "ensure app index",
        };
        f.write_str(name)
    }
}

/// An adapter failure, passed through unmodified.
#[derive(Debug, thiserror::Error)]
pub enum DependencyError {
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Payment(#[from] PaymentError),
}

#[derive(Debug, thiserror::Error)]
pub enum AppServiceError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("failed to {stage}: {source}")]
    Dependency {
        stage: Stage,
        #[source]
        source: DependencyError,
    },

    #[error("app {id} not found")]
    NotFound { id: String },

    #[error("data integrity fault: {0}")]
    Integrity(String),
}

impl AppServiceError {
    pub fn dependency(stage: Stage, source: impl Into<DependencyError>) -> Self {
        AppServiceError::Dependency {
            stage,
            source: source.into(),
        }
    }

    /// Validation and not-found faults can be fixed by the caller; the rest are server-side.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            AppServiceError::Validation(_) | AppServiceError::NotFound { .. }
        )
    }
}

impl From<ModelError> for AppServiceError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::ReferenceAlreadySet { .. } => AppServiceError::Integrity(err.to_string()),
            _ => AppServiceError::Validation(err.to_string()),
        }
    }
}
