use crate::app::AppService;
use crate::infra::config::AppConfig;
use axum::http::{HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct AppState {
    pub app_service: Arc<AppService>,
    /// Header set by the upstream identity provider with the authenticated user name.
    pub identity_header: HeaderName,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(app_service: Arc<AppService>, config: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            app_service,
            identity_header: HeaderName::from_bytes(config.identity_header.as_bytes())?,
            max_upload_bytes: config.max_upload_bytes,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    /// 200 with `data` serialized into the envelope.
    pub fn ok<T: Serialize>(data: &T) -> Response {
        match serde_json::to_value(data) {
            Ok(value) => (
                StatusCode::OK,
                Json(ApiResponse {
                    success: true,
                    data: Some(value),
                    error: None,
                }),
            )
                .into_response(),
            Err(e) => Self::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode response: {}", e),
            )
            .into_response(),
        }
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ApiResponse>) {
        (
            status,
            Json(ApiResponse {
                success: false,
                data: None,
                error: Some(message.into()),
            }),
        )
    }
}

/// Query string of `GET /search`. Missing parameters are treated as empty.
#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Full-text terms matched against app titles.
    #[serde(default)]
    pub title: String,
    /// Full-text terms matched against app descriptions.
    #[serde(default)]
    pub description: String,
}

/// Multipart body of `POST /upload`.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    pub title: String,
    pub description: String,
    /// Non-negative integer.
    pub price: String,
    #[schema(value_type = String, format = Binary)]
    pub media_file: Vec<u8>,
}

/// Form body of `POST /checkout`.
#[derive(Deserialize, Debug, ToSchema)]
pub struct CheckoutForm {
    #[serde(rename = "appID")]
    pub app_id: String,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct CheckoutResponse {
    pub url: String,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct RetractResponse {
    pub id: String,
    /// Number of index documents removed (0 when the app does not exist or is not yours).
    pub deleted: u64,
}
