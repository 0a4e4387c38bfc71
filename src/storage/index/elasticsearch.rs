//! Elasticsearch implementation of [`SearchIndex`] over the REST API.

use crate::domain::query::SearchQuery;
use crate::infra::config::ElasticsearchConfig;
use crate::storage::index::{IndexError, SearchIndex};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};

#[derive(Clone)]
pub struct ElasticsearchIndex {
    client: Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl ElasticsearchIndex {
    pub fn new(client: Client, config: &ElasticsearchConfig) -> Self {
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}/{}", self.base_url, path));
        match &self.username {
            Some(user) => builder.basic_auth(user, self.password.as_deref()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<JsonValue, IndexError> {
        let response = check_status(builder.send().await?).await?;
        Ok(response.json::<JsonValue>().await?)
    }
}

async fn check_status(response: Response) -> Result<Response, IndexError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(IndexError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Pulls `hits.hits[]._source` out of a search response body.
fn extract_sources(body: &JsonValue) -> Result<Vec<JsonValue>, IndexError> {
    let hits = body
        .pointer("/hits/hits")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| IndexError::MalformedResponse("missing hits.hits".to_string()))?;

    hits.iter()
        .map(|hit| {
            hit.get("_source")
                .cloned()
                .ok_or_else(|| IndexError::MalformedResponse("hit without _source".to_string()))
        })
        .collect()
}

fn deleted_count(body: &JsonValue) -> Result<u64, IndexError> {
    body.get("deleted")
        .and_then(JsonValue::as_u64)
        .ok_or_else(|| IndexError::MalformedResponse("missing deleted count".to_string()))
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn read(
        &self,
        query: &SearchQuery,
        collection: &str,
    ) -> Result<Vec<JsonValue>, IndexError> {
        let body = self
            .send(
                self.request(Method::POST, &format!("{}/_search", collection))
                    .json(&json!({ "query": query.to_dsl() })),
            )
            .await?;
        let sources = extract_sources(&body)?;
        debug!(collection, hits = sources.len(), "index read");
        Ok(sources)
    }

    async fn write(
        &self,
        document: &JsonValue,
        collection: &str,
        id: &str,
    ) -> Result<(), IndexError> {
        self.send(
            self.request(Method::PUT, &format!("{}/_doc/{}", collection, id))
                .query(&[("refresh", "true")])
                .json(document),
        )
        .await?;
        debug!(collection, id, "index write");
        Ok(())
    }

    async fn delete(&self, query: &SearchQuery, collection: &str) -> Result<u64, IndexError> {
        let body = self
            .send(
                self.request(Method::POST, &format!("{}/_delete_by_query", collection))
                    .query(&[("refresh", "true")])
                    .json(&json!({ "query": query.to_dsl() })),
            )
            .await?;
        let deleted = deleted_count(&body)?;
        debug!(collection, deleted, "index delete");
        Ok(deleted)
    }

    async fn ensure_collection(
        &self,
        collection: &str,
        mapping: &JsonValue,
    ) -> Result<bool, IndexError> {
        let response = self.request(Method::HEAD, collection).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            self.send(self.request(Method::PUT, collection).json(mapping))
                .await?;
            info!(collection, "created index");
            return Ok(true);
        }
        check_status(response).await?;
        Ok(false)
    }

    async fn ping(&self) -> Result<(), IndexError> {
        check_status(self.request(Method::GET, "").send().await?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::serve_fake;
    use axum::extract::{Path, Query, State};
    use axum::http::{header, HeaderMap};
    use axum::response::{IntoResponse, Response as AxumResponse};
    use axum::routing::{get, post, put};
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct FakeEs {
        calls: Arc<Mutex<Vec<(String, JsonValue)>>>,
        index_exists: Arc<AtomicBool>,
        search_status: StatusCode,
    }

    impl FakeEs {
        fn new(search_status: StatusCode) -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                index_exists: Arc::new(AtomicBool::new(false)),
                search_status,
            }
        }

        fn record(&self, call: String, body: JsonValue) {
            self.calls.lock().unwrap().push((call, body));
        }

        fn calls(&self) -> Vec<(String, JsonValue)> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn refresh(params: &HashMap<String, String>) -> &str {
        params.get("refresh").map(String::as_str).unwrap_or("unset")
    }

    async fn fake_search(
        State(fake): State<FakeEs>,
        Path(index): Path<String>,
        Json(body): Json<JsonValue>,
    ) -> AxumResponse {
        fake.record(format!("search {}", index), body);
        if !fake.search_status.is_success() {
            return (fake.search_status, "unavailable").into_response();
        }
        Json(json!({
            "hits": {
                "hits": [
                    { "_id": "app-2", "_source": { "id": "app-2" } },
                    { "_id": "app-1", "_source": { "id": "app-1" } }
                ]
            }
        }))
        .into_response()
    }

    async fn fake_write(
        State(fake): State<FakeEs>,
        Path((index, id)): Path<(String, String)>,
        Query(params): Query<HashMap<String, String>>,
        Json(body): Json<JsonValue>,
    ) -> AxumResponse {
        fake.record(format!("write {}/{} refresh={}", index, id, refresh(&params)), body);
        Json(json!({ "_id": id, "result": "created" })).into_response()
    }

    async fn fake_delete(
        State(fake): State<FakeEs>,
        Path(index): Path<String>,
        Query(params): Query<HashMap<String, String>>,
        Json(body): Json<JsonValue>,
    ) -> AxumResponse {
        fake.record(format!("delete {} refresh={}", index, refresh(&params)), body);
        Json(json!({ "took": 2, "deleted": 1, "failures": [] })).into_response()
    }

    async fn fake_index_exists(State(fake): State<FakeEs>) -> StatusCode {
        if fake.index_exists.load(Ordering::SeqCst) {
            StatusCode::OK
        } else {
            StatusCode::NOT_FOUND
        }
    }

    async fn fake_create_index(
        State(fake): State<FakeEs>,
        Path(index): Path<String>,
        Json(mapping): Json<JsonValue>,
    ) -> AxumResponse {
        fake.record(format!("create {}", index), mapping);
        fake.index_exists.store(true, Ordering::SeqCst);
        Json(json!({ "acknowledged": true, "index": index })).into_response()
    }

    async fn fake_root(headers: HeaderMap) -> AxumResponse {
        let auth = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
        if auth != Some("Basic ZWxhc3RpYzpzZWNyZXQ=") {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        Json(json!({ "cluster_name": "test" })).into_response()
    }

    fn fake_router(fake: FakeEs) -> Router {
        Router::new()
            .route("/", get(fake_root))
            .route("/:index", axum::routing::head(fake_index_exists).put(fake_create_index))
            .route("/:index/_search", post(fake_search))
            .route("/:index/_doc/:id", put(fake_write))
            .route("/:index/_delete_by_query", post(fake_delete))
            .with_state(fake)
    }

    fn index_at(base_url: &str, username: Option<&str>) -> ElasticsearchIndex {
        ElasticsearchIndex::new(
            Client::new(),
            &ElasticsearchConfig {
                url: base_url.to_string(),
                username: username.map(str::to_string),
                password: username.map(|_| "secret".to_string()),
            },
        )
    }

    #[tokio::test]
    async fn read_posts_match_query_and_keeps_hit_order() {
        let fake = FakeEs::new(StatusCode::OK);
        let base_url = serve_fake(fake_router(fake.clone())).await;

        let sources = index_at(&base_url, None)
            .read(&SearchQuery::discovery("Widget", ""), "apps")
            .await
            .unwrap();

        assert_eq!(sources, vec![json!({ "id": "app-2" }), json!({ "id": "app-1" })]);
        let calls = fake.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "search apps");
        assert_eq!(
            calls[0].1,
            json!({
                "query": {
                    "match": {
                        "title": { "query": "Widget", "operator": "and", "zero_terms_query": "none" }
                    }
                }
            })
        );
    }

    #[tokio::test]
    async fn write_and_delete_refresh_the_index() {
        let fake = FakeEs::new(StatusCode::OK);
        let base_url = serve_fake(fake_router(fake.clone())).await;
        let index = index_at(&base_url, None);
        let document = json!({ "id": "app-1", "user": "alice", "title": "Widget" });

        index.write(&document, "apps", "app-1").await.unwrap();
        let deleted = index
            .delete(&SearchQuery::owned_by("app-1", "alice"), "apps")
            .await
            .unwrap();

        assert_eq!(deleted, 1);
        let calls = fake.calls();
        assert_eq!(calls[0], ("write apps/app-1 refresh=true".to_string(), document));
        assert_eq!(calls[1].0, "delete apps refresh=true");
        assert_eq!(
            calls[1].1,
            json!({
                "query": {
                    "bool": {
                        "must": [
                            { "term": { "id": "app-1" } },
                            { "term": { "user": "alice" } }
                        ]
                    }
                }
            })
        );
    }

    #[tokio::test]
    async fn ensure_collection_creates_only_when_missing() {
        let fake = FakeEs::new(StatusCode::OK);
        let base_url = serve_fake(fake_router(fake.clone())).await;
        let index = index_at(&base_url, None);
        let mapping = json!({ "mappings": { "properties": { "id": { "type": "keyword" } } } });

        assert!(index.ensure_collection("apps", &mapping).await.unwrap());
        assert!(!index.ensure_collection("apps", &mapping).await.unwrap());

        assert_eq!(fake.calls(), vec![("create apps".to_string(), mapping)]);
    }

    #[tokio::test]
    async fn backend_status_is_passed_through() {
        let fake = FakeEs::new(StatusCode::SERVICE_UNAVAILABLE);
        let base_url = serve_fake(fake_router(fake.clone())).await;

        let err = index_at(&base_url, None)
            .read(&SearchQuery::by_id("app-1"), "apps")
            .await
            .unwrap_err();

        match err {
            IndexError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn ping_sends_basic_auth() {
        let fake = FakeEs::new(StatusCode::OK);
        let base_url = serve_fake(fake_router(fake)).await;

        index_at(&base_url, Some("elastic")).ping().await.unwrap();
        let err = index_at(&base_url, None).ping().await.unwrap_err();
        assert!(matches!(err, IndexError::Status { status: 401, .. }));
    }

    #[test]
    fn extracts_sources_in_hit_order() {
        let body = json!({
            "took": 3,
            "hits": {
                "total": { "value": 2, "relation": "eq" },
                "hits": [
                    { "_id": "b", "_score": 2.0, "_source": { "id": "b" } },
                    { "_id": "a", "_score": 1.0, "_source": { "id": "a" } }
                ]
            }
        });
        let sources = extract_sources(&body).unwrap();
        assert_eq!(sources, vec![json!({ "id": "b" }), json!({ "id": "a" })]);
    }

    #[test]
    fn empty_hits_are_not_an_error() {
        let body = json!({ "hits": { "hits": [] } });
        assert!(extract_sources(&body).unwrap().is_empty());
    }

    #[test]
    fn missing_hits_is_malformed() {
        let err = extract_sources(&json!({ "error": "boom" })).unwrap_err();
        assert!(matches!(err, IndexError::MalformedResponse(_)));
    }

    #[test]
    fn reads_delete_by_query_count() {
        let body = json!({ "took": 5, "deleted": 1, "failures": [] });
        assert_eq!(deleted_count(&body).unwrap(), 1);
    }

    #[test]
    fn builds_urls_without_double_slashes() {
        let index = ElasticsearchIndex::new(
            Client::new(),
            &ElasticsearchConfig {
                url: "http://localhost:9200/".to_string(),
                username: None,
                password: None,
            },
        );
        let request = index
            .request(Method::POST, "apps/_search")
            .build()
            .unwrap();
        assert_eq!(request.url().as_str(), "http://localhost:9200/apps/_search");
    }
}
