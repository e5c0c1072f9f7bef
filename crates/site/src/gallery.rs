//! Bucket-backed image galleries.

use beyond_core::error::CoreError;
use beyond_core::media::buckets;
use beyond_store::query::SortOrder;
use beyond_store::storage::{ListOptions, SortColumn};

/// Maximum objects listed per gallery.
pub const LISTING_LIMIT: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gallery {
    /// Project photos, newest first.
    Portfolio,
    /// Home page auto-scrolling strip, by name.
    Autoscroll,
}

impl Gallery {
    pub const ALL: [Gallery; 2] = [Gallery::Portfolio, Gallery::Autoscroll];

    pub fn name(self) -> &'static str {
        match self {
            Gallery::Portfolio => "portfolio",
            Gallery::Autoscroll => "autoscroll",
        }
    }

    pub fn bucket(self) -> &'static str {
        match self {
            Gallery::Portfolio => buckets::PROJECTS,
            Gallery::Autoscroll => buckets::AUTOSCROLL,
        }
    }

    /// Table whose change events signal that the gallery changed.
    pub fn trigger_table(self) -> &'static str {
        match self {
            Gallery::Portfolio => "portfolio",
            Gallery::Autoscroll => "autoscroll_gallery",
        }
    }

    /// Whether uploads also record a row in the trigger table.
    pub fn records_uploads(self) -> bool {
        matches!(self, Gallery::Portfolio)
    }

    pub fn list_options(self) -> ListOptions {
        let sort = match self {
            Gallery::Portfolio => (SortColumn::CreatedAt, SortOrder::Desc),
            Gallery::Autoscroll => (SortColumn::Name, SortOrder::Asc),
        };
        ListOptions {
            limit: LISTING_LIMIT,
            offset: 0,
            sort,
            search: None,
        }
    }

    pub fn parse(name: &str) -> Result<Self, CoreError> {
        Gallery::ALL
            .into_iter()
            .find(|g| g.name() == name)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown gallery '{name}'. Must be one of: portfolio, autoscroll"
                ))
            })
    }
}
