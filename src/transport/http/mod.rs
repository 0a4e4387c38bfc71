pub mod router;
pub mod types;
pub mod handlers {
    pub mod checkout;
    pub mod common;
    pub mod health;
    pub mod retract;
    pub mod search;
    pub mod upload;
}

pub use router::{create_router, ApiDoc};
pub use types::AppState;
