use axum::routing::{get, post};
use axum::Router;

use crate::handlers::language;
use crate::state::AppState;

/// Language routes, merged at the `/api/v1` root.
///
/// ```text
/// GET  /language          -> get_language
/// PUT  /language          -> set_language
/// POST /language/toggle   -> toggle_language
/// GET  /i18n              -> dictionary
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/language",
            get(language::get_language).put(language::set_language),
        )
        .route("/language/toggle", post(language::toggle_language))
        .route("/i18n", get(language::dictionary))
}
