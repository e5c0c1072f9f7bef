//! Admin content handlers. Every endpoint requires [`RequireAdmin`].

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use beyond_core::content::{AboutUpdate, ContactInput, HeroInput, ServiceInput, ServiceUpdate};
use beyond_core::types::DbId;
use beyond_site::editor::UploadFile;
use beyond_site::Gallery;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Hero
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/hero
pub async fn get_hero(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let hero = state.editor.hero().await?;
    Ok(Json(DataResponse { data: hero }))
}

/// PUT /api/v1/admin/hero
pub async fn save_hero(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<HeroInput>,
) -> AppResult<impl IntoResponse> {
    let hero = state.editor.save_hero(input).await?;
    tracing::info!(id = hero.id, user = %admin.username, "Hero saved");
    Ok(Json(DataResponse { data: hero }))
}

/// POST /api/v1/admin/hero/image
///
/// Multipart with a single file part.
pub async fn replace_hero_image(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let file = single_file(multipart).await?;
    let hero = state.editor.replace_hero_image(file).await?;
    tracing::info!(id = hero.id, user = %admin.username, "Hero image replaced");
    Ok(Json(DataResponse { data: hero }))
}

// ---------------------------------------------------------------------------
// About
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/about
pub async fn list_about(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let sections = state.editor.about_sections().await?;
    Ok(Json(DataResponse { data: sections }))
}

/// PUT /api/v1/admin/about/{id}
pub async fn update_about(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AboutUpdate>,
) -> AppResult<impl IntoResponse> {
    let section = state.editor.update_about(id, input).await?;
    tracing::info!(id, user = %admin.username, "About section updated");
    Ok(Json(DataResponse { data: section }))
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/services
pub async fn list_services(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let services = state.editor.services().await?;
    Ok(Json(DataResponse { data: services }))
}

/// POST /api/v1/admin/services
pub async fn create_service(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<ServiceInput>,
) -> AppResult<impl IntoResponse> {
    let service = state.editor.create_service(input).await?;
    tracing::info!(id = service.id, slug = %service.slug, user = %admin.username, "Service created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: service })))
}

/// PUT /api/v1/admin/services/{id}
pub async fn update_service(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ServiceUpdate>,
) -> AppResult<impl IntoResponse> {
    let service = state.editor.update_service(id, input).await?;
    tracing::info!(id, user = %admin.username, "Service updated");
    Ok(Json(DataResponse { data: service }))
}

/// DELETE /api/v1/admin/services/{id}
pub async fn delete_service(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.editor.delete_service(id).await?;
    tracing::info!(id, user = %admin.username, "Service deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Service details
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/service-details
pub async fn list_service_details(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let details = state.editor.service_details().await?;
    Ok(Json(DataResponse { data: details }))
}

/// POST /api/v1/admin/service-details
pub async fn create_service_detail(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<ServiceInput>,
) -> AppResult<impl IntoResponse> {
    let detail = state.editor.create_service_detail(input).await?;
    tracing::info!(id = detail.id, slug = %detail.slug, user = %admin.username, "Service detail created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// PUT /api/v1/admin/service-details/{id}
pub async fn update_service_detail(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ServiceUpdate>,
) -> AppResult<impl IntoResponse> {
    let detail = state.editor.update_service_detail(id, input).await?;
    tracing::info!(id, user = %admin.username, "Service detail updated");
    Ok(Json(DataResponse { data: detail }))
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/contact
pub async fn get_contact(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let contact = state.editor.contact().await?;
    Ok(Json(DataResponse { data: contact }))
}

/// PUT /api/v1/admin/contact
pub async fn save_contact(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<ContactInput>,
) -> AppResult<impl IntoResponse> {
    let contact = state.editor.save_contact(input).await?;
    tracing::info!(id = contact.id, user = %admin.username, "Contact saved");
    Ok(Json(DataResponse { data: contact }))
}

// ---------------------------------------------------------------------------
// Galleries and uploads
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/galleries/{gallery}
pub async fn list_gallery(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(gallery): Path<String>,
) -> AppResult<impl IntoResponse> {
    let gallery = Gallery::parse(&gallery)?;
    let images = state.editor.gallery_images(gallery).await?;
    Ok(Json(DataResponse { data: images }))
}

/// POST /api/v1/admin/galleries/{gallery}
///
/// Multipart with one or more file parts, uploaded in order. A failure
/// stops the batch and responds `UPLOAD_FAILED` listing what was stored.
pub async fn upload_gallery(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(gallery): Path<String>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let gallery = Gallery::parse(&gallery)?;
    let files = collect_files(multipart).await?;
    if files.is_empty() {
        return Err(AppError::BadRequest("No files in request".into()));
    }

    let uploaded = state
        .editor
        .upload_gallery(gallery, files, |p| {
            tracing::debug!(uploaded = p.uploaded, total = p.total, "Upload progress");
        })
        .await?;

    tracing::info!(
        gallery = gallery.name(),
        count = uploaded.len(),
        user = %admin.username,
        "Gallery upload complete"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: uploaded })))
}

/// DELETE /api/v1/admin/galleries/{gallery}/{name}
pub async fn delete_gallery_image(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((gallery, name)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    let gallery = Gallery::parse(&gallery)?;
    state.editor.delete_gallery_image(gallery, &name).await?;
    tracing::info!(gallery = gallery.name(), name = %name, user = %admin.username, "Gallery image deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/uploads/{bucket}
///
/// Compress and store one image, returning its key and public URL.
pub async fn upload_image(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let file = single_file(multipart).await?;
    let image = state.editor.upload_image(&bucket, file).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: image })))
}

// ---------------------------------------------------------------------------
// Multipart helpers
// ---------------------------------------------------------------------------

/// Every file part in the request, in order.
async fn collect_files(mut multipart: Multipart) -> AppResult<Vec<UploadFile>> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read '{name}': {e}")))?;
        files.push(UploadFile {
            name,
            bytes: bytes.to_vec(),
        });
    }
    Ok(files)
}

async fn single_file(multipart: Multipart) -> AppResult<UploadFile> {
    let mut files = collect_files(multipart).await?;
    match files.len() {
        1 => Ok(files.remove(0)),
        0 => Err(AppError::BadRequest("No file in request".into())),
        n => Err(AppError::BadRequest(format!("Expected one file, got {n}"))),
    }
}
