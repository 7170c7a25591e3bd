//! Media library routes.
//!
//! Exposes the upload ingestion pipeline and attachment CRUD over REST.
//! Upload metadata (parent, title, caption, description, alt text) rides
//! in the query string; the request body is the raw file payload.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::{AppState, middleware::AuthUser};
use leafpress_core::capability::CapabilityGate;
use leafpress_core::media::{
    Context, MediaError, MediaService, Presenter, UpdateAttachmentInput, UploadRequest, schema,
};
use leafpress_shared::{PageRequest, PageResponse};

/// Creates the protected media routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/media", get(list_media).post(create_media))
        .route(
            "/media/{id}",
            get(get_media).put(update_media).delete(delete_media),
        )
}

/// Creates the public media routes.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/media/schema", get(get_schema))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters accepted by the upload endpoint.
#[derive(Debug, Deserialize)]
pub struct CreateMediaParams {
    /// Parent resource to attach the upload to.
    pub post_id: Option<i64>,
    /// Title for the attachment.
    pub title: Option<String>,
    /// Caption text.
    pub caption: Option<String>,
    /// Description text.
    pub description: Option<String>,
    /// Alternative text.
    pub alt_text: Option<String>,
}

/// Query parameters for a single attachment read.
#[derive(Debug, Default, Deserialize)]
pub struct GetMediaParams {
    /// Representation context.
    #[serde(default)]
    pub context: Context,
}

/// Query parameters for the attachment list.
#[derive(Debug, Deserialize)]
pub struct ListMediaParams {
    /// Filter by parent resource.
    pub parent: Option<i64>,
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Representation context.
    #[serde(default)]
    pub context: Context,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

/// Request body for updating an attachment.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMediaRequest {
    /// New title.
    pub title: Option<String>,
    /// New caption.
    pub caption: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New alternative text.
    pub alt_text: Option<String>,
    /// New comment policy.
    pub comment_status: Option<String>,
    /// New ping policy.
    pub ping_status: Option<String>,
    /// New parent resource; an explicit null detaches the attachment.
    #[serde(default, deserialize_with = "double_option")]
    pub post_id: Option<Option<i64>>,
}

/// Keeps "field absent" distinct from "field set to null".
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Helper Functions
// ============================================================================

fn media_service(state: &AppState) -> MediaService {
    MediaService::new(
        state.storage.clone(),
        state.media.clone(),
        CapabilityGate::new(Arc::clone(&state.capabilities)),
    )
}

fn presenter(state: &AppState) -> Presenter {
    Presenter::new(&state.site_base_url, state.storage.public_base_url())
}

/// Maps a media error to its HTTP response.
fn error_response(e: &MediaError) -> Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = if status.is_server_error() {
        error!(error = %e, "Media operation failed");
        "An error occurred".to_string()
    } else {
        e.to_string()
    };

    (
        status,
        Json(json!({ "error": e.code(), "message": message })),
    )
        .into_response()
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/media`
/// Upload a file and create its attachment record.
async fn create_media(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<CreateMediaParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = UploadRequest {
        body,
        content_type: header_value(&headers, header::CONTENT_TYPE),
        content_disposition: header_value(&headers, header::CONTENT_DISPOSITION),
        content_md5: headers
            .get("content-md5")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
        post_id: params.post_id,
        title: params.title,
        caption: params.caption,
        description: params.description,
        alt_text: params.alt_text,
    };

    match media_service(&state).create(auth.identity(), request).await {
        Ok(attachment) => {
            info!(
                attachment_id = attachment.id,
                user_id = auth.identity().user_id,
                "Attachment uploaded"
            );
            let location = format!("{}/api/v1/media/{}", state.site_base_url, attachment.id);
            let representation = presenter(&state).represent(&attachment, Context::Edit);
            (
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(representation),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/media`
/// List attachments, newest first.
async fn list_media(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListMediaParams>,
) -> Response {
    // The edit context over a whole listing requires upload rights.
    if params.context == Context::Edit && !state.capabilities.can_upload(auth.identity()) {
        return error_response(&MediaError::ForbiddenContext);
    }

    let page = PageRequest {
        page: params.page,
        per_page: params.per_page,
    };

    match media_service(&state).list(params.parent, &page).await {
        Ok((attachments, total)) => {
            let p = presenter(&state);
            let items: Vec<serde_json::Value> = attachments
                .iter()
                .map(|a| p.represent(a, params.context))
                .collect();
            Json(PageResponse::new(items, page.page, page.per_page, total)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/media/{id}`
/// Fetch a single attachment.
async fn get_media(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Query(params): Query<GetMediaParams>,
) -> Response {
    match media_service(&state)
        .retrieve(Some(auth.identity()), id, params.context)
        .await
    {
        Ok(attachment) => Json(presenter(&state).represent(&attachment, params.context))
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// PUT `/media/{id}`
/// Update an attachment's fields.
async fn update_media(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateMediaRequest>,
) -> Response {
    let changes = UpdateAttachmentInput {
        title: payload.title,
        caption: payload.caption,
        description: payload.description,
        alt_text: payload.alt_text,
        comment_status: payload.comment_status,
        ping_status: payload.ping_status,
        post_id: payload.post_id,
    };

    match media_service(&state)
        .update(auth.identity(), id, changes)
        .await
    {
        Ok(attachment) => {
            Json(presenter(&state).represent(&attachment, Context::Edit)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// DELETE `/media/{id}`
/// Delete an attachment and its stored payload.
async fn delete_media(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Response {
    match media_service(&state).delete(auth.identity(), id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/media/schema`
/// Describe the attachment representation.
async fn get_schema() -> Response {
    Json(schema()).into_response()
}
