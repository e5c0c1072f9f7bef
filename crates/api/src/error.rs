use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use beyond_core::error::CoreError;
use beyond_events::EventError;
use beyond_site::error::UploadedImage;
use beyond_site::SiteError;
use beyond_store::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Produces `{ "error", "code" }` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The hosted backend failed or answered unexpectedly.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Event(#[from] EventError),

    /// A batch upload stopped part-way. `uploaded` stay stored.
    #[error("Upload of '{failed_file}' failed: {reason}")]
    UploadFailed {
        uploaded: Vec<UploadedImage>,
        failed_file: String,
        reason: String,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<SiteError> for AppError {
    fn from(err: SiteError) -> Self {
        match err {
            SiteError::Core(e) => AppError::Core(e),
            SiteError::Store(e) => AppError::Store(e),
            SiteError::Event(e) => AppError::Event(e),
            SiteError::UploadFailed {
                uploaded,
                failed_file,
                reason,
            } => AppError::UploadFailed {
                uploaded,
                failed_file,
                reason,
            },
            SiteError::Task(msg) => AppError::InternalError(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, key } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} '{key}' not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            AppError::Store(err) => {
                tracing::error!(error = %err, status = ?err.status(), "Content store error");
                (
                    StatusCode::BAD_GATEWAY,
                    "STORE_ERROR",
                    "The content store request failed".to_string(),
                )
            }

            AppError::Event(err) => (StatusCode::CONFLICT, "CONFLICT", err.to_string()),

            AppError::UploadFailed {
                uploaded,
                failed_file,
                reason,
            } => {
                tracing::error!(failed_file = %failed_file, reason = %reason, uploaded = uploaded.len(), "Upload failed");
                let body = json!({
                    "error": format!("Upload of '{failed_file}' failed"),
                    "code": "UPLOAD_FAILED",
                    "failed_file": failed_file,
                    "uploaded": uploaded,
                });
                return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response();
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
