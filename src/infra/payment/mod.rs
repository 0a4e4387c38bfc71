//! Payment gateway adapter.
//!
//! Amounts are always in minor currency units. Calls are not idempotent and are never retried.

use async_trait::async_trait;

pub mod memory;
pub mod stripe;

pub use memory::InMemoryGateway;
pub use stripe::StripeGateway;

/// Gateway references created for one app.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductPrice {
    pub product_ref: String,
    pub price_ref: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("payment gateway returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed payment gateway response: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_product_with_price(
        &self,
        title: &str,
        description: &str,
        amount_minor_units: u64,
    ) -> Result<ProductPrice, PaymentError>;

    /// Opens a checkout session for `price_ref`; redirect targets are scoped to `origin`.
    async fn create_checkout_session(
        &self,
        origin: &str,
        price_ref: &str,
    ) -> Result<String, PaymentError>;

    async fn ping(&self) -> Result<(), PaymentError>;
}

/// Redirect targets for a checkout started from `origin`.
pub fn redirect_urls(origin: &str) -> (String, String) {
    let origin = origin.trim_end_matches('/');
    (
        format!("{}?success=true", origin),
        format!("{}?canceled=true", origin),
    )
}
