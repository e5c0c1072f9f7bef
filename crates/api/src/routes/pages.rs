use axum::routing::get;
use axum::Router;

use crate::handlers::pages;
use crate::state::AppState;

/// Routes mounted at `/pages`.
///
/// ```text
/// GET /{page}              -> get_page
/// GET /services/{slug}     -> get_service_page
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{page}", get(pages::get_page))
        .route("/services/{slug}", get(pages::get_service_page))
}
