//! Language context with an injected persistence port.
//!
//! [`LanguageContext`] replaces an ambient "current language" global. It is
//! built per request (or per session) from a [`PreferenceStore`], and every
//! change is written back through the same port so that the next load
//! restores it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::i18n;
use crate::language::{Direction, Language};

/// Preference key holding the chosen language code.
pub const LANGUAGE_KEY: &str = "language";

/// Durable key-value storage for user preferences.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Document-level attributes that follow the active language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMeta {
    pub lang: Language,
    pub dir: Direction,
    pub title: &'static str,
}

impl DocumentMeta {
    pub fn for_language(language: Language) -> Self {
        Self {
            lang: language,
            dir: language.direction(),
            title: i18n::document_title(language),
        }
    }
}

/// The active language plus the port it persists through.
pub struct LanguageContext<P: PreferenceStore> {
    language: Language,
    prefs: P,
}

impl<P: PreferenceStore> LanguageContext<P> {
    /// Restore the language from `prefs`, defaulting to English when
    /// nothing (or something unrecognised) is stored.
    pub fn load(prefs: P) -> Self {
        let language = prefs
            .get(LANGUAGE_KEY)
            .and_then(|code| Language::from_code(&code))
            .unwrap_or_default();
        Self { language, prefs }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn document(&self) -> DocumentMeta {
        DocumentMeta::for_language(self.language)
    }

    /// Switch to `language`, persist it, and return the new document meta.
    pub fn set(&mut self, language: Language) -> DocumentMeta {
        self.language = language;
        self.prefs.set(LANGUAGE_KEY, language.code());
        self.document()
    }

    /// Flip to the other language.
    pub fn toggle(&mut self) -> DocumentMeta {
        self.set(self.language.toggled())
    }

    /// Translate a dictionary key in the active language.
    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        i18n::t(self.language, key)
    }

    /// Give the port back, e.g. to flush pending cookie writes.
    pub fn into_prefs(self) -> P {
        self.prefs
    }
}

/// In-memory [`PreferenceStore`]; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
    }
}
