//! Stripe implementation of the payment gateway, using the form-encoded REST API.

use crate::infra::config::StripeConfig;
use crate::infra::payment::{redirect_urls, PaymentError, PaymentGateway, ProductPrice};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value as JsonValue;
use tracing::info;

#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
    base_url: String,
    secret_key: String,
    currency: String,
}

impl StripeGateway {
    pub fn new(client: Client, config: &StripeConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
            currency: config.currency.clone(),
        }
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}/v1/{}", self.base_url, path))
            .bearer_auth(&self.secret_key)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<JsonValue, PaymentError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<JsonValue>().await?)
    }
}

fn string_field(body: &JsonValue, field: &str) -> Result<String, PaymentError> {
    body.get(field)
        .and_then(JsonValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| PaymentError::MalformedResponse(format!("missing '{}'", field)))
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_product_with_price(
        &self,
        title: &str,
        description: &str,
        amount_minor_units: u64,
    ) -> Result<ProductPrice, PaymentError> {
        let mut product_form = vec![("name", title)];
        // Stripe rejects an empty description string.
        if !description.is_empty() {
            product_form.push(("description", description));
        }
        let product = self.send(self.post("products").form(&product_form)).await?;
        let product_ref = string_field(&product, "id")?;

        let amount = amount_minor_units.to_string();
        let price = self
            .send(self.post("prices").form(&[
                ("product", product_ref.as_str()),
                ("unit_amount", amount.as_str()),
                ("currency", self.currency.as_str()),
            ]))
            .await?;
        let price_ref = string_field(&price, "id")?;

        info!(product = %product_ref, price = %price_ref, "created Stripe product and price");
        Ok(ProductPrice {
            product_ref,
            price_ref,
        })
    }

    async fn create_checkout_session(
        &self,
        origin: &str,
        price_ref: &str,
    ) -> Result<String, PaymentError> {
        let (success_url, cancel_url) = redirect_urls(origin);
        let session = self
            .send(self.post("checkout/sessions").form(&[
                ("line_items[0][price]", price_ref),
                ("line_items[0][quantity]", "1"),
                ("mode", "payment"),
                ("success_url", success_url.as_str()),
                ("cancel_url", cancel_url.as_str()),
            ]))
            .await?;
        string_field(&session, "url")
    }

    async fn ping(&self) -> Result<(), PaymentError> {
        let builder = self
            .client
            .get(format!("{}/v1/balance", self.base_url))
            .bearer_auth(&self.secret_key);
        self.send(builder).await?;
        Ok(())
    }
}
