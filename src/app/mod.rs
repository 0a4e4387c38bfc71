pub mod app_service;
pub mod error;

pub use app_service::{AppService, BackendHealth, PublishState};
pub use error::{AppServiceError, DependencyError, Stage};
