use crate::domain::model::{ModelError, PublishRequest};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Stored field names of the `apps` collection.
///
/// These are the keys of the indexed document, not the Rust field names.
pub mod fields {
    pub const ID: &str = "id";
    pub const OWNER: &str = "user";
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const PRICE: &str = "price";
    pub const MEDIA_URL: &str = "url";
    pub const PRODUCT_REF: &str = "product_id";
    pub const PRICE_REF: &str = "price_id";
}

/// A published digital good.
///
/// The gateway references and the media URL start out empty and can each be attached
/// exactly once. Only a fully resolved app may be written to the search index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct App {
    id: String,
    #[serde(rename = "user")]
    owner: String,
    title: String,
    #[serde(default)]
    description: String,
    price: u64,
    #[serde(rename = "url", default, skip_serializing_if = "Option::is_none")]
    media_url: Option<String>,
    #[serde(rename = "product_id", default, skip_serializing_if = "Option::is_none")]
    product_ref: Option<String>,
    #[serde(rename = "price_id", default, skip_serializing_if = "Option::is_none")]
    price_ref: Option<String>,
}

impl App {
    /// Creates an unresolved app with a freshly generated id.
    pub fn new(request: PublishRequest) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), request)
    }

    pub fn with_id(id: impl Into<String>, request: PublishRequest) -> Self {
        let (owner, title, description, price) = request.into_parts();
        Self {
            id: id.into(),
            owner,
            title,
            description,
            price,
            media_url: None,
            product_ref: None,
            price_ref: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn media_url(&self) -> Option<&str> {
        self.media_url.as_deref()
    }

    pub fn product_ref(&self) -> Option<&str> {
        self.product_ref.as_deref()
    }

    pub fn price_ref(&self) -> Option<&str> {
        self.price_ref.as_deref()
    }

    /// Records the gateway product and price created for this app.
    pub fn attach_gateway_refs(
        &mut self,
        product_ref: String,
        price_ref: String,
    ) -> Result<(), ModelError> {
        if self.product_ref.is_some() || self.price_ref.is_some() {
            return Err(ModelError::ReferenceAlreadySet {
                id: self.id.clone(),
                field: "gateway reference",
            });
        }
        self.product_ref = Some(product_ref);
        self.price_ref = Some(price_ref);
        Ok(())
    }

    /// Records the public URL of the uploaded media object.
    pub fn attach_media_url(&mut self, url: String) -> Result<(), ModelError> {
        if self.media_url.is_some() {
            return Err(ModelError::ReferenceAlreadySet {
                id: self.id.clone(),
                field: "media url",
            });
        }
        self.media_url = Some(url);
        Ok(())
    }

    /// True once every external reference is present, i.e. the app may become discoverable.
    pub fn is_fully_resolved(&self) -> bool {
        self.media_url.is_some() && self.product_ref.is_some() && self.price_ref.is_some()
    }
}
