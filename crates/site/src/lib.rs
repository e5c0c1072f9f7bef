//! Site pages: language-resolved views over the hosted content, live page
//! sessions that refetch on change, and the admin content editor.

pub mod content;
pub mod editor;
pub mod error;
pub mod gallery;
pub mod live;
pub mod pages;
pub mod views;

pub use content::SiteContent;
pub use editor::ContentEditor;
pub use error::SiteError;
pub use gallery::Gallery;
pub use live::{LivePage, PageSink};
pub use pages::{PageView, SitePage};
