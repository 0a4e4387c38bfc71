// src/bin/api_server.rs

use appstore_backend::transport;
use appstore_backend::{AppConfig, AppService};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // --- Configuration ---
    println!("> Loading configuration...");
    let config = AppConfig::from_env()?;

    // --- Service Initialization ---
    println!("> Initializing AppService...");
    let app_service = Arc::new(AppService::from_config(&config)?);
    if app_service.ensure_index().await? {
        println!("> Created index '{}'.", app_service.collection());
    } else {
        println!("> Index '{}' already exists.", app_service.collection());
    }
    let app_state = transport::http::AppState::new(app_service, &config)?;
    println!("> AppService initialized successfully.");

    // --- API Server Initialization ---
    println!("> Starting API server...");
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    println!("> API server listening on http://{}", config.bind_addr);
    println!("> Swagger UI available at http://{}/swagger-ui", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            println!("\n> Shutdown signal received (Ctrl+C)...");
        })
        .await?;

    println!("> Graceful shutdown complete.");
    Ok(())
}
