//! The site's page catalogue.

use beyond_core::content::{
    AboutSection, ContactContent, ContentRecord, HeroContent, ServiceDetail, ServiceSummary,
};
use beyond_core::error::CoreError;
use serde::Serialize;

use crate::gallery::Gallery;
use crate::views::{AboutView, ContactView, GalleryView, HeroView, ServiceDetailView, ServicesView};

/// A page that can be rendered and kept live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitePage {
    Hero,
    About,
    /// Service cards; `limit` trims the list for the home page preview.
    Services { limit: Option<usize> },
    ServiceDetail { slug: String },
    Contact,
    Portfolio,
    /// Home page auto-scrolling strip.
    Gallery,
}

impl SitePage {
    /// Resolve a page name as used in URLs.
    pub fn parse(name: &str, slug: Option<String>, limit: Option<usize>) -> Result<Self, CoreError> {
        let page = match name {
            "hero" => SitePage::Hero,
            "about" => SitePage::About,
            "services" => match slug {
                Some(slug) => SitePage::ServiceDetail { slug },
                None => SitePage::Services { limit },
            },
            "service" => SitePage::ServiceDetail {
                slug: slug.ok_or_else(|| {
                    CoreError::Validation("Page 'service' requires a slug".into())
                })?,
            },
            "contact" => SitePage::Contact,
            "portfolio" => SitePage::Portfolio,
            "gallery" => SitePage::Gallery,
            other => {
                return Err(CoreError::Validation(format!(
                    "Unknown page '{other}'. Must be one of: hero, about, services, service, contact, portfolio, gallery"
                )))
            }
        };
        Ok(page)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SitePage::Hero => "hero",
            SitePage::About => "about",
            SitePage::Services { .. } => "services",
            SitePage::ServiceDetail { .. } => "service",
            SitePage::Contact => "contact",
            SitePage::Portfolio => "portfolio",
            SitePage::Gallery => "gallery",
        }
    }

    /// Table whose changes should refresh this page.
    pub fn watched_table(&self) -> &'static str {
        match self {
            SitePage::Hero => HeroContent::TABLE,
            SitePage::About => AboutSection::TABLE,
            SitePage::Services { .. } => ServiceSummary::TABLE,
            SitePage::ServiceDetail { .. } => ServiceDetail::TABLE,
            SitePage::Contact => ContactContent::TABLE,
            SitePage::Portfolio => Gallery::Portfolio.trigger_table(),
            SitePage::Gallery => Gallery::Autoscroll.trigger_table(),
        }
    }

    /// Every table any page watches.
    pub fn all_watched_tables() -> Vec<String> {
        [
            SitePage::Hero,
            SitePage::About,
            SitePage::Services { limit: None },
            SitePage::ServiceDetail { slug: String::new() },
            SitePage::Contact,
            SitePage::Portfolio,
            SitePage::Gallery,
        ]
        .iter()
        .map(|p| p.watched_table().to_string())
        .collect()
    }

    /// Whether an absent result means the page does not exist.
    pub fn missing_is_not_found(&self) -> bool {
        matches!(self, SitePage::ServiceDetail { .. })
    }
}

/// A rendered page body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PageView {
    Hero(HeroView),
    About(AboutView),
    Services(ServicesView),
    ServiceDetail(ServiceDetailView),
    Contact(ContactView),
    Gallery(GalleryView),
}
