use crate::transport::http::handlers::common::{fault_response, AuthenticatedUser};
use crate::transport::http::types::{ApiResponse, AppState, CheckoutForm, CheckoutResponse};
use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Form;
use tracing::info;

#[utoipa::path(
    post,
    path = "/checkout",
    request_body(content = CheckoutForm, content_type = "application/x-www-form-urlencoded"),
    params(
        ("Origin" = String, Header, description = "Origin the checkout redirects back to"),
        ("x-authenticated-user" = String, Header, description = "Identity set by the upstream identity provider")
    ),
    responses(
        (status = 200, description = "Checkout session created (data.url)", body = ApiResponse),
        (status = 400, description = "Missing appID or Origin", body = ApiResponse),
        (status = 404, description = "Unknown app", body = ApiResponse),
        (status = 500, description = "Duplicate app documents", body = ApiResponse),
        (status = 502, description = "Index or payment gateway failure", body = ApiResponse)
    )
)]
pub async fn checkout_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    headers: HeaderMap,
    form: Result<Form<CheckoutForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(f) => f,
        Err(e) => {
            return ApiResponse::error(
                StatusCode::BAD_REQUEST,
                format!("Invalid form body: {} (expected: appID=...)", e),
            )
            .into_response()
        }
    };

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());
    let Some(origin) = origin else {
        return ApiResponse::error(StatusCode::BAD_REQUEST, "Origin header is required")
            .into_response();
    };

    info!(%user, app_id = %form.app_id, "received checkout request");
    match state.app_service.checkout(origin, &form.app_id).await {
        Ok(url) => ApiResponse::ok(&CheckoutResponse { url }),
        Err(e) => fault_response(e).into_response(),
    }
}
