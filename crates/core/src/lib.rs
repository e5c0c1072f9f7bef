//! Domain layer for the Beyond Basic content service.
//!
//! Pure, I/O-free building blocks shared by every other crate: the two site
//! languages and their dictionary, the language context with its
//! persistence port, content records and their bilingual accessors, image
//! reference resolution, and the page lifecycle state machine.

pub mod content;
pub mod error;
pub mod i18n;
pub mod imaging;
pub mod language;
pub mod media;
pub mod page;
pub mod preferences;
pub mod selector;
pub mod slug;
pub mod types;
