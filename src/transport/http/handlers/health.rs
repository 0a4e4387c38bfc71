use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

fn status_of(result: &Result<(), String>) -> serde_json::Value {
    match result {
        Ok(()) => serde_json::json!({ "status": "ok" }),
        Err(e) => serde_json::json!({ "status": "unreachable", "error": e }),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy (all backends reachable)", body = ApiResponse),
        (status = 503, description = "Service is unhealthy (a backend is unreachable)", body = ApiResponse)
    )
)]
pub async fn healthcheck_handler(State(state): State<AppState>) -> impl IntoResponse {
    let health = state.app_service.health().await;
    let data = serde_json::json!({
        "status": if health.is_healthy() { "ok" } else { "unhealthy" },
        "checked_at": chrono::Utc::now().to_rfc3339(),
        "backends": {
            "index": status_of(&health.index),
            "object_store": status_of(&health.object_store),
            "payment_gateway": status_of(&health.payment_gateway),
        }
    });

    if health.is_healthy() {
        (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                data: Some(data),
                error: None,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                success: false,
                data: Some(data),
                error: Some("One or more backends are unreachable".to_string()),
            }),
        )
    }
}
