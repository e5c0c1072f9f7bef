pub mod admin;
pub mod auth;
pub mod health;
pub mod language;
pub mod pages;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws/pages/{page}                  live page session (WebSocket)
///
/// /language                         get, set (PUT)
/// /language/toggle                  toggle (POST)
/// /i18n                             UI dictionary
///
/// /pages/{page}                     one-shot render
/// /pages/services/{slug}            service detail render
///
/// /auth/login                       admin login (public)
///
/// /admin/...                        content editing (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws/pages/{page}", get(ws::page_session))
        .merge(language::router())
        .nest("/pages", pages::router())
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
}
