//! The app service.
//!
//! This module keeps a single logical app consistent across the payment gateway, the
//! object store and the search index. It is responsible for:
//! 1.  Publishing: gateway product/price, then media upload, then the index write. The index
//!     write comes last so that only fully resolved apps ever become discoverable.
//! 2.  Answering discovery searches against the index.
//! 3.  Starting a checkout for an indexed app.
//! 4.  Retracting an app from the index on behalf of its owner.
//!
//! There is no rollback. A publish that fails part-way leaves the resources created by the
//! earlier steps behind (orphans); they are logged and left for external reconciliation.

use crate::app::error::{AppServiceError, Stage};
use crate::domain::model::{App, PublishRequest};
use crate::domain::query::SearchQuery;
use crate::infra::config::{AppConfig, BackendConfig};
use crate::infra::http_client;
use crate::infra::payment::{InMemoryGateway, PaymentGateway, StripeGateway};
use crate::storage::index::{app_index_mapping, ElasticsearchIndex, InMemoryIndex, SearchIndex};
use crate::storage::object::{GcsObjectStore, InMemoryObjectStore, MediaStream, ObjectStore};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Stored prices are multiplied by this factor to get the gateway amount in minor units.
pub const MINOR_UNITS_PER_PRICE_UNIT: u64 = 100;

/// Progress of a single publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    Start,
    ProductCreated,
    MediaStored,
    Indexed,
    Done,
}

/// Reachability of each backend, as reported by their `ping`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendHealth {
    pub index: Result<(), String>,
    pub object_store: Result<(), String>,
    pub payment_gateway: Result<(), String>,
}

impl BackendHealth {
    pub fn is_healthy(&self) -> bool {
        self.index.is_ok() && self.object_store.is_ok() && self.payment_gateway.is_ok()
    }
}

pub struct AppService {
    index: Arc<dyn SearchIndex>,
    store: Arc<dyn ObjectStore>,
    gateway: Arc<dyn PaymentGateway>,
    collection: String,
}

impl AppService {
    pub fn new(
        index: Arc<dyn SearchIndex>,
        store: Arc<dyn ObjectStore>,
        gateway: Arc<dyn PaymentGateway>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            index,
            store,
            gateway,
            collection: collection.into(),
        }
    }

    /// Builds the adapters named by `config` and wires them into a service.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        match &config.backends {
            BackendConfig::Memory => Ok(Self::new(
                Arc::new(InMemoryIndex::new()),
                Arc::new(InMemoryObjectStore::default()),
                Arc::new(InMemoryGateway::default()),
                config.app_index.clone(),
            )),
            BackendConfig::Remote {
                elasticsearch,
                gcs,
                stripe,
            } => {
                let client = http_client(config.http_timeout)?;
                Ok(Self::new(
                    Arc::new(ElasticsearchIndex::new(client.clone(), elasticsearch)),
                    Arc::new(GcsObjectStore::new(client.clone(), gcs)?),
                    Arc::new(StripeGateway::new(client, stripe)),
                    config.app_index.clone(),
                ))
            }
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Creates the app collection with its mapping if it does not exist yet.
    pub async fn ensure_index(&self) -> Result<bool, AppServiceError> {
        let created = self
            .index
            .ensure_collection(&self.collection, &app_index_mapping())
            .await
            .map_err(|e| AppServiceError::dependency(Stage::EnsureIndex, e))?;
        if created {
            info!(collection = %self.collection, "app index created");
        }
        Ok(created)
    }

    /// Publishes a new app: gateway product/price, media upload, index write, in that order.
    ///
    /// Each step runs only if the previous one succeeded. Nothing is rolled back on failure.
    pub async fn publish(
        &self,
        request: PublishRequest,
        media: MediaStream,
    ) -> Result<App, AppServiceError> {
        let mut app = App::new(request);
        let mut state = PublishState::Start;

        let amount = app
            .price()
            .checked_mul(MINOR_UNITS_PER_PRICE_UNIT)
            .ok_or_else(|| {
                AppServiceError::Validation(format!("price {} is too large", app.price()))
            })?;

        let refs = match self
            .gateway
            .create_product_with_price(app.title(), app.description(), amount)
            .await
        {
            Ok(refs) => refs,
            Err(e) => {
                return Err(abort(
                    &app,
                    state,
                    AppServiceError::dependency(Stage::CreateProduct, e),
                ))
            }
        };
        app.attach_gateway_refs(refs.product_ref, refs.price_ref)?;
        state = PublishState::ProductCreated;
        debug!(app_id = %app.id(), ?state, "publish progressed");

        let media_url = match self.store.upload(app.id(), media).await {
            Ok(url) => url,
            Err(e) => {
                return Err(abort(
                    &app,
                    state,
                    AppServiceError::dependency(Stage::UploadMedia, e),
                ))
            }
        };
        app.attach_media_url(media_url)?;
        state = PublishState::MediaStored;
        debug!(app_id = %app.id(), ?state, "publish progressed");

        if !app.is_fully_resolved() {
            return Err(abort(
                &app,
                state,
                AppServiceError::Integrity(format!("app {} is not fully resolved", app.id())),
            ));
        }
        let document = serde_json::to_value(&app)
            .map_err(|e| AppServiceError::Integrity(format!("cannot encode app: {}", e)))?;
        if let Err(e) = self
            .index
            .write(&document, &self.collection, app.id())
            .await
        {
            return Err(abort(
                &app,
                state,
                AppServiceError::dependency(Stage::IndexApp, e),
            ));
        }
        state = PublishState::Indexed;
        debug!(app_id = %app.id(), ?state, "publish progressed");

        state = PublishState::Done;
        info!(app_id = %app.id(), owner = %app.owner(), ?state, "app published");
        Ok(app)
    }

    /// Discovery search. Results keep the index's ranking order.
    pub async fn search(&self, title: &str, description: &str) -> Result<Vec<App>, AppServiceError> {
        let query = SearchQuery::discovery(title, description);
        let docs = self
            .index
            .read(&query, &self.collection)
            .await
            .map_err(|e| AppServiceError::dependency(Stage::Search, e))?;
        debug!(title, description, hits = docs.len(), "search completed");
        docs.into_iter().map(decode_app).collect()
    }

    /// Looks up a single app by exact id.
    pub async fn find_by_id(&self, app_id: &str) -> Result<App, AppServiceError> {
        let mut docs = self
            .index
            .read(&SearchQuery::by_id(app_id), &self.collection)
            .await
            .map_err(|e| AppServiceError::dependency(Stage::Lookup, e))?;

        match docs.len() {
            0 => Err(AppServiceError::NotFound {
                id: app_id.to_string(),
            }),
            1 => decode_app(docs.remove(0)),
            n => Err(AppServiceError::Integrity(format!(
                "{} documents share app id {}",
                n, app_id
            ))),
        }
    }

    /// Starts a checkout for `app_id` and returns the gateway's checkout URL.
    pub async fn checkout(&self, origin: &str, app_id: &str) -> Result<String, AppServiceError> {
        let app = self.find_by_id(app_id).await?;
        let price_ref = app.price_ref().ok_or_else(|| {
            AppServiceError::Integrity(format!("indexed app {} has no price reference", app_id))
        })?;

        let url = self
            .gateway
            .create_checkout_session(origin, price_ref)
            .await
            .map_err(|e| AppServiceError::dependency(Stage::CreateCheckout, e))?;
        info!(app_id, price = %price_ref, "checkout session created");
        Ok(url)
    }

    /// Removes the app from the index if `owner` owns it. Returns the number of documents
    /// removed; zero is not an error. Stored media and gateway objects are left untouched.
    pub async fn retract(&self, app_id: &str, owner: &str) -> Result<u64, AppServiceError> {
        let deleted = self
            .index
            .delete(&SearchQuery::owned_by(app_id, owner), &self.collection)
            .await
            .map_err(|e| AppServiceError::dependency(Stage::Retract, e))?;
        info!(app_id, owner, deleted, "retract completed");
        Ok(deleted)
    }

    pub async fn health(&self) -> BackendHealth {
        let (index, object_store, payment_gateway) = tokio::join!(
            self.index.ping(),
            self.store.ping(),
            self.gateway.ping()
        );
        BackendHealth {
            index: index.map_err(|e| e.to_string()),
            object_store: object_store.map_err(|e| e.to_string()),
            payment_gateway: payment_gateway.map_err(|e| e.to_string()),
        }
    }
}

fn decode_app(doc: serde_json::Value) -> Result<App, AppServiceError> {
    serde_json::from_value(doc)
        .map_err(|e| AppServiceError::Integrity(format!("malformed app document: {}", e)))
}

/// Logs what a failed publish leaves behind and hands the error back.
fn abort(app: &App, state: PublishState, err: AppServiceError) -> AppServiceError {
    match state {
        PublishState::Start => {
            warn!(app_id = %app.id(), error = %err, "publish failed before any external write");
        }
        PublishState::ProductCreated => warn!(
            app_id = %app.id(),
            product = app.product_ref().unwrap_or_default(),
            price = app.price_ref().unwrap_or_default(),
            error = %err,
            "publish failed, gateway product orphaned"
        ),
        PublishState::MediaStored | PublishState::Indexed | PublishState::Done => warn!(
            app_id = %app.id(),
            product = app.product_ref().unwrap_or_default(),
            price = app.price_ref().unwrap_or_default(),
            media = app.media_url().unwrap_or_default(),
            error = %err,
            "publish failed, gateway product and media orphaned"
        ),
    }
    err
}
