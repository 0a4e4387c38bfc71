pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{AppService, AppServiceError};
pub use domain::model::{App, PublishRequest};
pub use domain::query::SearchQuery;
pub use infra::config::AppConfig;
