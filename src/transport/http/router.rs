use crate::domain::model::App;
use crate::transport::http::handlers::{checkout, health, retract, search, upload};
use crate::transport::http::types::{
    ApiResponse, AppState, CheckoutForm, CheckoutResponse, RetractResponse, UploadForm,
};
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        upload::upload_handler,
        search::search_handler,
        checkout::checkout_handler,
        retract::retract_handler
    ),
    components(schemas(
        ApiResponse,
        App,
        UploadForm,
        CheckoutForm,
        CheckoutResponse,
        RetractResponse
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    let max_upload_bytes = app_state.max_upload_bytes;
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/upload", post(upload::upload_handler))
        .route("/search", get(search::search_handler))
        .route("/checkout", post(checkout::checkout_handler))
        .route("/app/:id", delete(retract::retract_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(app_state)
}
