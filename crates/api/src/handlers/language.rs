//! Language preference endpoints.
//!
//! The chosen language lives in the `language` cookie, so the next request
//! (a reload) restores it.

use std::collections::BTreeMap;

use axum::response::{IntoResponse, Response};
use axum::Json;
use beyond_core::i18n;
use beyond_core::language::Language;
use beyond_core::preferences::{DocumentMeta, LanguageContext};
use serde::{Deserialize, Serialize};

use crate::preferences::{CookiePreferences, RequestLanguage};
use crate::response::DataResponse;

#[derive(Debug, Deserialize)]
pub struct SetLanguageRequest {
    pub language: Language,
}

#[derive(Debug, Serialize)]
pub struct DictionaryResponse {
    pub language: Language,
    pub entries: BTreeMap<&'static str, &'static str>,
}

/// GET /api/v1/language
pub async fn get_language(RequestLanguage(ctx): RequestLanguage) -> impl IntoResponse {
    Json(DataResponse {
        data: ctx.document(),
    })
}

/// PUT /api/v1/language
pub async fn set_language(
    RequestLanguage(mut ctx): RequestLanguage,
    Json(input): Json<SetLanguageRequest>,
) -> Response {
    let meta = ctx.set(input.language);
    tracing::debug!(language = %meta.lang, "Language set");
    with_cookies(meta, ctx)
}

/// POST /api/v1/language/toggle
pub async fn toggle_language(RequestLanguage(mut ctx): RequestLanguage) -> Response {
    let meta = ctx.toggle();
    tracing::debug!(language = %meta.lang, "Language toggled");
    with_cookies(meta, ctx)
}

/// GET /api/v1/i18n
///
/// The UI dictionary in the current language.
pub async fn dictionary(RequestLanguage(ctx): RequestLanguage) -> impl IntoResponse {
    let language = ctx.language();
    Json(DataResponse {
        data: DictionaryResponse {
            language,
            entries: i18n::entries(language).collect(),
        },
    })
}

fn with_cookies(meta: DocumentMeta, ctx: LanguageContext<CookiePreferences>) -> Response {
    let mut response = Json(DataResponse { data: meta }).into_response();
    ctx.into_prefs().apply(&mut response);
    response
}
