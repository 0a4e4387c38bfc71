use crate::domain::model::PublishRequest;
use crate::storage::object::media_from_bytes;
use crate::transport::http::handlers::common::{fault_response, AuthenticatedUser};
use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tracing::info;

#[derive(Default)]
struct UploadParts {
    title: String,
    description: String,
    price: String,
    media: Option<Bytes>,
}

async fn read_upload_parts(multipart: &mut Multipart) -> Result<UploadParts, String> {
    let mut parts = UploadParts::default();
    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => parts.title = field.text().await.map_err(|e| e.to_string())?,
            "description" => parts.description = field.text().await.map_err(|e| e.to_string())?,
            "price" => parts.price = field.text().await.map_err(|e| e.to_string())?,
            "media_file" => parts.media = Some(field.bytes().await.map_err(|e| e.to_string())?),
            _ => {}
        }
    }
    Ok(parts)
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    params(
        ("x-authenticated-user" = String, Header, description = "Identity set by the upstream identity provider")
    ),
    responses(
        (status = 200, description = "App published", body = ApiResponse),
        (status = 400, description = "Invalid input or missing media file", body = ApiResponse),
        (status = 401, description = "No authenticated user", body = ApiResponse),
        (status = 502, description = "A backend rejected the publish", body = ApiResponse)
    )
)]
pub async fn upload_handler(
    State(state): State<AppState>,
    AuthenticatedUser(owner): AuthenticatedUser,
    mut multipart: Multipart,
) -> Response {
    info!(%owner, "received upload request");

    let parts = match read_upload_parts(&mut multipart).await {
        Ok(p) => p,
        Err(e) => {
            return ApiResponse::error(
                StatusCode::BAD_REQUEST,
                format!("Invalid multipart body: {}", e),
            )
            .into_response()
        }
    };

    let Some(media) = parts.media else {
        return ApiResponse::error(StatusCode::BAD_REQUEST, "Media file is not available")
            .into_response();
    };

    let request =
        match PublishRequest::parse(&owner, &parts.title, &parts.description, &parts.price) {
            Ok(r) => r,
            Err(e) => return fault_response(e.into()).into_response(),
        };

    match state
        .app_service
        .publish(request, media_from_bytes(media))
        .await
    {
        Ok(app) => ApiResponse::ok(&app),
        Err(e) => fault_response(e).into_response(),
    }
}
