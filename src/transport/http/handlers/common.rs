use crate::app::AppServiceError;
use crate::transport::http::types::{ApiResponse, AppState};
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, warn};

/// The user name established by the identity provider in front of this service.
///
/// Requests without the identity header are rejected with 401 before any handler runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = (StatusCode, Json<ApiResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(&state.identity_header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| AuthenticatedUser(v.to_string()))
            .ok_or_else(|| {
                ApiResponse::error(StatusCode::UNAUTHORIZED, "Missing authenticated user")
            })
    }
}

pub fn fault_status(err: &AppServiceError) -> StatusCode {
    match err {
        AppServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        AppServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppServiceError::Dependency { .. } => StatusCode::BAD_GATEWAY,
        AppServiceError::Integrity(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps an app service fault to a response. Server-side faults are logged with their cause
/// and reported to the caller without detail.
pub fn fault_response(err: AppServiceError) -> (StatusCode, Json<ApiResponse>) {
    let status = fault_status(&err);
    if err.is_caller_error() {
        warn!(%status, error = %err, "request rejected");
        return ApiResponse::error(status, err.to_string());
    }

    error!(%status, error = %err, "request failed");
    let message = match err {
        AppServiceError::Dependency { stage, .. } => format!("Failed to {} in backend", stage),
        _ => "Internal data error".to_string(),
    };
    ApiResponse::error(status, message)
}
