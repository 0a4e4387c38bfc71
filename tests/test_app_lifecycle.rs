//! End-to-end flow over HTTP: publish, search, checkout and retract against in-memory backends.

use appstore_backend::{transport, AppConfig, AppService};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::sync::Arc;

const IDENTITY: &str = "x-authenticated-user";

async fn start_server() -> Result<String, Box<dyn std::error::Error>> {
    let config = AppConfig::from_lookup(|key| match key {
        "BACKEND" => Some("memory".to_string()),
        _ => None,
    })?;
    let app_service = Arc::new(AppService::from_config(&config)?);
    app_service.ensure_index().await?;
    let app_state = transport::http::AppState::new(app_service, &config)?;
    let router = transport::http::create_router(app_state);

    // Bind to an ephemeral port so tests can run in parallel.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Ok(format!("http://127.0.0.1:{}", port))
}

fn upload_form(title: &str, description: &str, price: &str) -> Form {
    Form::new()
        .text("title", title.to_string())
        .text("description", description.to_string())
        .text("price", price.to_string())
        .part(
            "media_file",
            Part::bytes(b"PK\x03\x04 widget bundle".to_vec()).file_name("widget.zip"),
        )
}

async fn search(
    client: &reqwest::Client,
    base_url: &str,
    user: &str,
    title: &str,
    description: &str,
) -> Result<Vec<Value>, Box<dyn std::error::Error>> {
    let resp = client
        .get(format!("{}/search", base_url))
        .header(IDENTITY, user)
        .query(&[("title", title), ("description", description)])
        .send()
        .await?;
    assert_eq!(resp.status(), 200);
    let body = resp.json::<Value>().await?;
    Ok(body["data"].as_array().cloned().unwrap_or_default())
}

#[tokio::test]
async fn test_publish_search_checkout_retract() -> Result<(), Box<dyn std::error::Error>> {
    let base_url = start_server().await?;
    let client = reqwest::Client::new();

    // --- PUBLISH ---
    let resp = client
        .post(format!("{}/upload", base_url))
        .header(IDENTITY, "alice")
        .multipart(upload_form("Widget", "A widget", "500"))
        .send()
        .await?;
    assert_eq!(resp.status(), 200);
    let body = resp.json::<Value>().await?;
    assert!(body["success"].as_bool().unwrap_or(false));

    let app = &body["data"];
    let app_id = app["id"].as_str().unwrap_or_default().to_string();
    assert!(!app_id.is_empty());
    assert_eq!(app["user"], "alice");
    assert_eq!(app["title"], "Widget");
    assert_eq!(app["description"], "A widget");
    assert_eq!(app["price"], 500);
    assert!(app["url"].as_str().unwrap_or_default().ends_with(&app_id));
    assert!(app["product_id"].is_string());
    let price_ref = app["price_id"].as_str().unwrap_or_default().to_string();
    assert!(!price_ref.is_empty());

    // --- SEARCH ---
    let hits = search(&client, &base_url, "carol", "Widget", "").await?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["id"], app_id.as_str());

    let hits = search(&client, &base_url, "carol", "Widget", "widget").await?;
    assert_eq!(hits.len(), 1);
    assert!(search(&client, &base_url, "carol", "", "").await?.is_empty());

    // --- CHECKOUT ---
    let resp = client
        .post(format!("{}/checkout", base_url))
        .header(IDENTITY, "carol")
        .header("Origin", "https://shop.example")
        .form(&[("appID", app_id.as_str())])
        .send()
        .await?;
    assert_eq!(resp.status(), 200);
    let body = resp.json::<Value>().await?;
    let checkout_url = body["data"]["url"].as_str().unwrap_or_default();
    assert!(!checkout_url.is_empty());
    assert!(checkout_url.contains(&price_ref));

    // --- RETRACT (wrong owner) ---
    let resp = client
        .delete(format!("{}/app/{}", base_url, app_id))
        .header(IDENTITY, "bob")
        .send()
        .await?;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.json::<Value>().await?["data"]["deleted"], 0);
    assert_eq!(search(&client, &base_url, "carol", "Widget", "").await?.len(), 1);

    // --- RETRACT (owner), twice ---
    for expected in [1, 0] {
        let resp = client
            .delete(format!("{}/app/{}", base_url, app_id))
            .header(IDENTITY, "alice")
            .send()
            .await?;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.json::<Value>().await?["data"]["deleted"], expected);
    }
    assert!(search(&client, &base_url, "carol", "Widget", "").await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_rejects_bad_requests() -> Result<(), Box<dyn std::error::Error>> {
    let base_url = start_server().await?;
    let client = reqwest::Client::new();

    // No identity header.
    let resp = client
        .get(format!("{}/search", base_url))
        .query(&[("title", "Widget")])
        .send()
        .await?;
    assert_eq!(resp.status(), 401);

    // Unparsable price.
    let resp = client
        .post(format!("{}/upload", base_url))
        .header(IDENTITY, "alice")
        .multipart(upload_form("Widget", "", "five dollars"))
        .send()
        .await?;
    assert_eq!(resp.status(), 400);

    // Empty title.
    let resp = client
        .post(format!("{}/upload", base_url))
        .header(IDENTITY, "alice")
        .multipart(upload_form("  ", "", "5"))
        .send()
        .await?;
    assert_eq!(resp.status(), 400);

    // Missing media file.
    let resp = client
        .post(format!("{}/upload", base_url))
        .header(IDENTITY, "alice")
        .multipart(Form::new().text("title", "Widget").text("price", "5"))
        .send()
        .await?;
    assert_eq!(resp.status(), 400);
    let body = resp.json::<Value>().await?;
    assert_eq!(body["error"], "Media file is not available");

    // Nothing above may have become discoverable.
    assert!(search(&client, &base_url, "alice", "Widget", "").await?.is_empty());

    // Checkout of an unknown app.
    let resp = client
        .post(format!("{}/checkout", base_url))
        .header(IDENTITY, "alice")
        .header("Origin", "https://shop.example")
        .form(&[("appID", "does-not-exist")])
        .send()
        .await?;
    assert_eq!(resp.status(), 404);

    // Checkout without an origin.
    let resp = client
        .post(format!("{}/checkout", base_url))
        .header(IDENTITY, "alice")
        .form(&[("appID", "does-not-exist")])
        .send()
        .await?;
    assert_eq!(resp.status(), 400);

    Ok(())
}

#[tokio::test]
async fn test_health_reports_backends() -> Result<(), Box<dyn std::error::Error>> {
    let base_url = start_server().await?;
    let body = reqwest::get(format!("{}/health", base_url))
        .await?
        .json::<Value>()
        .await?;
    assert!(body["success"].as_bool().unwrap_or(false));
    assert_eq!(body["data"]["backends"]["index"]["status"], "ok");
    assert_eq!(body["data"]["backends"]["object_store"]["status"], "ok");
    assert_eq!(body["data"]["backends"]["payment_gateway"]["status"], "ok");
    Ok(())
}
