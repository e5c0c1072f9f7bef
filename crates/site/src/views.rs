//! Language-resolved page views.
//!
//! Views are what a page renders: every text field already selected for
//! one language and every image reference already resolved to a URL.

use beyond_core::content::{
    AboutField, AboutSection, ContactContent, ContactField, HeroContent, HeroField,
    ServiceDetail, ServiceField, ServiceSummary,
};
use beyond_core::i18n;
use beyond_core::language::Language;
use beyond_core::media::{buckets, ImageResolver};
use beyond_core::selector::select;
use beyond_core::types::Timestamp;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeroView {
    pub title: String,
    pub tagline: String,
    pub subtitle: String,
    pub image_url: String,
    pub cta: String,
}

impl HeroView {
    pub fn build(hero: &HeroContent, lang: Language, images: &ImageResolver) -> Self {
        Self {
            title: select(hero, HeroField::Title, lang),
            tagline: select(hero, HeroField::Tagline, lang),
            subtitle: select(hero, HeroField::Subtitle, lang),
            image_url: images.resolve(hero.hero_image.as_deref(), buckets::HERO),
            cta: i18n::t(lang, "viewProjects").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AboutSectionView {
    pub key: Option<String>,
    pub heading: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AboutView {
    pub title: String,
    pub sections: Vec<AboutSectionView>,
}

impl AboutView {
    /// `sections` must already be in display (ascending id) order.
    pub fn build(sections: &[AboutSection], lang: Language) -> Self {
        Self {
            title: i18n::t(lang, "aboutTitle").to_string(),
            sections: sections
                .iter()
                .map(|s| AboutSectionView {
                    key: s.section_key.clone(),
                    heading: select(s, AboutField::Heading, lang),
                    text: select(s, AboutField::Text, lang),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceCardView {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
}

impl ServiceCardView {
    pub fn build(service: &ServiceSummary, lang: Language, images: &ImageResolver) -> Self {
        Self {
            id: service.id,
            slug: service.slug.clone(),
            title: select(service, ServiceField::Title, lang),
            description: select(service, ServiceField::Description, lang),
            image_url: images.resolve(service.image_url.as_deref(), buckets::SERVICES),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServicesView {
    pub title: String,
    pub cards: Vec<ServiceCardView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceDetailView {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub back_label: String,
}

impl ServiceDetailView {
    pub fn build(detail: &ServiceDetail, lang: Language, images: &ImageResolver) -> Self {
        Self {
            slug: detail.slug.clone(),
            title: select(detail, ServiceField::Title, lang),
            description: select(detail, ServiceField::Description, lang),
            image_url: images.resolve(detail.image_url.as_deref(), buckets::SERVICES),
            back_label: i18n::t(lang, "backToServices").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactView {
    pub title: String,
    pub description: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: String,
    pub map_embed: Option<String>,
}

impl ContactView {
    pub fn build(contact: &ContactContent, lang: Language) -> Self {
        Self {
            title: select(contact, ContactField::Title, lang),
            description: select(contact, ContactField::Description, lang),
            phone: non_blank(&contact.phone),
            email: non_blank(&contact.email),
            address: select(contact, ContactField::Address, lang),
            map_embed: non_blank(&contact.map_embed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryImageView {
    pub name: String,
    pub url: String,
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryView {
    pub title: String,
    pub images: Vec<GalleryImageView>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
