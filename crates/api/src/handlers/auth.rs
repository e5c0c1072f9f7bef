//! Handlers for the `/auth` resource.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use beyond_core::error::CoreError;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_admin;
use crate::auth::ROLE_ADMIN;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub role: &'static str,
}

/// POST /api/v1/auth/login
///
/// Verify the admin credentials and issue an access token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let valid = verify_admin(&state.config.admin, &input.username, &input.password)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !valid {
        tracing::warn!(username = %input.username, "Rejected admin login");
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid username or password".into(),
        )));
    }

    let (access_token, claims) =
        generate_access_token(&input.username, ROLE_ADMIN, &state.config.jwt)
            .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(username = %claims.sub, jti = %claims.jti, "Admin logged in");

    Ok(Json(DataResponse {
        data: AuthResponse {
            access_token,
            token_type: "Bearer",
            expires_in: claims.exp - claims.iat,
            role: ROLE_ADMIN,
        },
    }))
}
