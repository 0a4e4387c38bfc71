use crate::transport::http::handlers::common::{fault_response, AuthenticatedUser};
use crate::transport::http::types::{ApiResponse, AppState, SearchParams};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use tracing::debug;

#[utoipa::path(
    get,
    path = "/search",
    params(
        SearchParams,
        ("x-authenticated-user" = String, Header, description = "Identity set by the upstream identity provider")
    ),
    responses(
        (status = 200, description = "Matching apps in ranking order (data is an array of App)", body = ApiResponse),
        (status = 401, description = "No authenticated user", body = ApiResponse),
        (status = 502, description = "Search index unavailable", body = ApiResponse)
    )
)]
pub async fn search_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(params): Query<SearchParams>,
) -> Response {
    debug!(%user, title = %params.title, description = %params.description, "received search request");
    match state
        .app_service
        .search(&params.title, &params.description)
        .await
    {
        Ok(apps) => ApiResponse::ok(&apps),
        Err(e) => fault_response(e).into_response(),
    }
}
