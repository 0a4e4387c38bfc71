//! Google Cloud Storage implementation of [`ObjectStore`] over the JSON API.

use crate::infra::config::GcsConfig;
use crate::storage::object::{MediaStream, ObjectStore, StorageError};
use async_trait::async_trait;
use reqwest::{Body, Client, Response, Url};
use serde_json::{json, Value as JsonValue};
use tracing::info;

#[derive(Clone)]
pub struct GcsObjectStore {
    client: Client,
    base_url: Url,
    bucket: String,
    access_token: String,
}

impl GcsObjectStore {
    pub fn new(client: Client, config: &GcsConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow::anyhow!(
                "GCS base url '{}' cannot be used as a base",
                config.base_url
            ));
        }
        Ok(Self {
            client,
            base_url,
            bucket: config.bucket.clone(),
            access_token: config.access_token.clone(),
        })
    }

    /// `{base}/{prefix..}/b/{bucket}/o[/{name}[/{suffix}]]` with every segment percent-encoded.
    fn url(&self, prefix: &[&str], name: Option<&str>, suffix: &[&str]) -> Result<Url, StorageError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StorageError::InvalidObjectUrl(self.base_url.to_string()))?;
            segments.pop_if_empty();
            segments.extend(prefix);
            segments.extend(["b", self.bucket.as_str(), "o"]);
            if let Some(name) = name {
                segments.push(name);
            }
            segments.extend(suffix);
        }
        Ok(url)
    }
}

async fn check_status(response: Response) -> Result<Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StorageError::Status {
        status: status.as_u16(),
        body,
    })
}

fn media_link(attrs: &JsonValue) -> Result<String, StorageError> {
    attrs
        .get("mediaLink")
        .and_then(JsonValue::as_str)
        .filter(|link| !link.is_empty())
        .map(str::to_string)
        .ok_or_else(|| StorageError::MalformedResponse("object has no mediaLink".to_string()))
}

#[async_trait]
impl ObjectStore for GcsObjectStore {
    async fn upload(&self, name: &str, media: MediaStream) -> Result<String, StorageError> {
        // 1. Stream the media into the object.
        let upload_url = self.url(&["upload", "storage", "v1"], None, &[])?;
        let response = self
            .client
            .post(upload_url)
            .bearer_auth(&self.access_token)
            .query(&[("uploadType", "media"), ("name", name)])
            .body(Body::wrap_stream(media))
            .send()
            .await?;
        check_status(response).await?;

        // 2. Grant public read.
        let acl_url = self.url(&["storage", "v1"], Some(name), &["acl"])?;
        let response = self
            .client
            .post(acl_url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "entity": "allUsers", "role": "READER" }))
            .send()
            .await?;
        check_status(response).await?;

        // 3. Resolve the public link.
        let attrs_url = self.url(&["storage", "v1"], Some(name), &[])?;
        let response = self
            .client
            .get(attrs_url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let attrs: JsonValue = check_status(response).await?.json().await?;
        let link = media_link(&attrs)?;

        info!(object = name, url = %link, "media saved to GCS");
        Ok(link)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StorageError::InvalidObjectUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["storage", "v1", "b", self.bucket.as_str()]);
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}
