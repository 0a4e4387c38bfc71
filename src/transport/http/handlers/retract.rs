use crate::transport::http::handlers::common::{fault_response, AuthenticatedUser};
use crate::transport::http::types::{ApiResponse, AppState, RetractResponse};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use tracing::info;

#[utoipa::path(
    delete,
    path = "/app/{id}",
    params(
        ("id" = String, Path, description = "App id"),
        ("x-authenticated-user" = String, Header, description = "Identity set by the upstream identity provider")
    ),
    responses(
        (status = 200, description = "Retract completed; deleted is 0 if nothing matched", body = ApiResponse),
        (status = 401, description = "No authenticated user", body = ApiResponse),
        (status = 502, description = "Search index unavailable", body = ApiResponse)
    )
)]
pub async fn retract_handler(
    State(state): State<AppState>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(id): Path<String>,
) -> Response {
    info!(%owner, app_id = %id, "received retract request");
    match state.app_service.retract(&id, &owner).await {
        Ok(deleted) => ApiResponse::ok(&RetractResponse { id, deleted }),
        Err(e) => fault_response(e).into_response(),
    }
}
