//! In-process payment gateway for local runs and tests.

use crate::infra::payment::{PaymentError, PaymentGateway, ProductPrice};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// A product/price pair recorded by [`InMemoryGateway`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedProduct {
    pub refs: ProductPrice,
    pub title: String,
    pub description: String,
    pub amount_minor_units: u64,
}

pub struct InMemoryGateway {
    checkout_base_url: String,
    next_id: AtomicU64,
    products: Mutex<Vec<RecordedProduct>>,
}

impl InMemoryGateway {
    pub fn new(checkout_base_url: impl Into<String>) -> Self {
        Self {
            checkout_base_url: checkout_base_url.into().trim_end_matches('/').to_string(),
            next_id: AtomicU64::new(1),
            products: Mutex::new(Vec::new()),
        }
    }

    pub async fn products(&self) -> Vec<RecordedProduct> {
        self.products.lock().await.clone()
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new("memory://checkout")
    }
}

#[async_trait]
impl PaymentGateway for InMemoryGateway {
    async fn create_product_with_price(
        &self,
        title: &str,
        description: &str,
        amount_minor_units: u64,
    ) -> Result<ProductPrice, PaymentError> {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        let refs = ProductPrice {
            product_ref: format!("prod_{}", n),
            price_ref: format!("price_{}", n),
        };
        self.products.lock().await.push(RecordedProduct {
            refs: refs.clone(),
            title: title.to_string(),
            description: description.to_string(),
            amount_minor_units,
        });
        Ok(refs)
    }

    async fn create_checkout_session(
        &self,
        origin: &str,
        price_ref: &str,
    ) -> Result<String, PaymentError> {
        let known = self
            .products
            .lock()
            .await
            .iter()
            .any(|p| p.refs.price_ref == price_ref);
        if !known {
            return Err(PaymentError::Status {
                status: 404,
                body: format!("No such price: '{}'", price_ref),
            });
        }
        Ok(format!(
            "{}/pay/{}?origin={}",
            self.checkout_base_url, price_ref, origin
        ))
    }

    async fn ping(&self) -> Result<(), PaymentError> {
        Ok(())
    }
}
