//! Language preference persisted in the `language` cookie.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Mutex;

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use beyond_core::preferences::{LanguageContext, PreferenceStore};

/// One year.
const COOKIE_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

/// A [`PreferenceStore`] over request cookies. Writes are buffered and
/// emitted as `Set-Cookie` headers by [`CookiePreferences::apply`].
#[derive(Debug, Default)]
pub struct CookiePreferences {
    incoming: HashMap<String, String>,
    outgoing: Mutex<Vec<(String, String)>>,
}

impl CookiePreferences {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let incoming = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        Self {
            incoming,
            outgoing: Mutex::new(Vec::new()),
        }
    }

    /// `Set-Cookie` values for every buffered write.
    pub fn set_cookie_values(&self) -> Vec<HeaderValue> {
        self.outgoing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter_map(|(key, value)| {
                let cookie =
                    format!("{key}={value}; Path=/; Max-Age={COOKIE_MAX_AGE_SECS}; SameSite=Lax");
                HeaderValue::from_str(&cookie).ok()
            })
            .collect()
    }

    /// Append the buffered writes to `response`.
    pub fn apply(&self, response: &mut Response) {
        for value in self.set_cookie_values() {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
}

impl PreferenceStore for CookiePreferences {
    fn get(&self, key: &str) -> Option<String> {
        let outgoing = self.outgoing.lock().unwrap_or_else(|e| e.into_inner());
        outgoing
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .or_else(|| self.incoming.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) {
        self.outgoing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((key.to_string(), value.to_string()));
    }
}

/// The request's [`LanguageContext`], restored from its cookies.
pub struct RequestLanguage(pub LanguageContext<CookiePreferences>);

impl<S: Send + Sync> FromRequestParts<S> for RequestLanguage {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let prefs = CookiePreferences::from_headers(&parts.headers);
        Ok(RequestLanguage(LanguageContext::load(prefs)))
    }
}
