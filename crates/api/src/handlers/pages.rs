//! One-shot page renders.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use beyond_core::language::Language;
use beyond_core::page::PageState;
use beyond_core::preferences::DocumentMeta;
use beyond_site::{PageView, SitePage};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::preferences::RequestLanguage;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters shared by page renders and live page sessions.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Service slug, for `services` / `service`.
    pub slug: Option<String>,
    /// Trims the services list (home page preview).
    pub limit: Option<usize>,
    /// Render in this language without changing the stored preference.
    pub lang: Option<Language>,
}

/// A page in one of its lifecycle states, as sent to clients.
#[derive(Debug, Clone, Serialize)]
pub struct PageBody {
    pub page: &'static str,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<PageView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub document: DocumentMeta,
}

impl PageBody {
    pub fn new(page: &SitePage, state: &PageState<PageView>, language: Language) -> Self {
        let (content, error) = match state {
            PageState::Ready(view) => (Some(view.clone()), None),
            PageState::Error(msg) => (None, Some(msg.clone())),
            PageState::Loading | PageState::Empty => (None, None),
        };
        Self {
            page: page.name(),
            state: state.name(),
            content,
            error,
            document: DocumentMeta::for_language(language),
        }
    }
}

/// GET /api/v1/pages/{page}
pub async fn get_page(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<PageQuery>,
    RequestLanguage(ctx): RequestLanguage,
) -> AppResult<impl IntoResponse> {
    let page = SitePage::parse(&name, query.slug, query.limit)?;
    let language = query.lang.unwrap_or(ctx.language());
    Ok(render(&state, &page, language).await)
}

/// GET /api/v1/pages/services/{slug}
pub async fn get_service_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
    RequestLanguage(ctx): RequestLanguage,
) -> impl IntoResponse {
    let page = SitePage::ServiceDetail { slug };
    let language = query.lang.unwrap_or(ctx.language());
    render(&state, &page, language).await
}

/// Render `page` once. `ready` is 200, `empty` is 200 (404 for a missing
/// service), `error` is 502.
async fn render(
    state: &AppState,
    page: &SitePage,
    language: Language,
) -> (StatusCode, Json<DataResponse<PageBody>>) {
    let outcome = state.content.render(page, language).await;
    if let Err(e) = &outcome {
        tracing::error!(page = page.name(), error = %e, "Page render failed");
    }
    let page_state = PageState::from_outcome(outcome);

    let status = match &page_state {
        PageState::Ready(_) | PageState::Loading => StatusCode::OK,
        PageState::Empty if page.missing_is_not_found() => StatusCode::NOT_FOUND,
        PageState::Empty => StatusCode::OK,
        PageState::Error(_) => StatusCode::BAD_GATEWAY,
    };

    (
        status,
        Json(DataResponse {
            data: PageBody::new(page, &page_state, language),
        }),
    )
}
