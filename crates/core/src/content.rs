//! Site content records and admin write payloads.
//!
//! Every record is a row owned by the remote store. Bilingual columns are
//! optional because the store does not enforce them; display code goes
//! through [`crate::selector::select`] which fills the gaps.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::selector::{Bilingual, Pair};
use crate::types::{DbId, Timestamp};

/// A row type stored in a named remote table.
pub trait ContentRecord: DeserializeOwned + Send + Sync + 'static {
    /// Remote table name.
    const TABLE: &'static str;
    /// Human-readable entity name for errors and logs.
    const ENTITY: &'static str;

    fn id(&self) -> DbId;
}

// ---------------------------------------------------------------------------
// Hero
// ---------------------------------------------------------------------------

/// Singleton hero banner; the row with the largest id is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroContent {
    pub id: DbId,
    #[serde(default)]
    pub en_title: Option<String>,
    #[serde(default)]
    pub ar_title: Option<String>,
    #[serde(default)]
    pub en_tagline: Option<String>,
    #[serde(default)]
    pub ar_tagline: Option<String>,
    #[serde(default)]
    pub en_subtitle: Option<String>,
    #[serde(default)]
    pub ar_subtitle: Option<String>,
    /// Object key in `hero-images` or a full URL.
    #[serde(default)]
    pub hero_image: Option<String>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeroField {
    Title,
    Tagline,
    Subtitle,
}

impl Bilingual for HeroContent {
    type Field = HeroField;

    fn pair(&self, field: HeroField) -> Pair<'_> {
        match field {
            HeroField::Title => Pair::new(&self.en_title, &self.ar_title),
            HeroField::Tagline => Pair::new(&self.en_tagline, &self.ar_tagline),
            HeroField::Subtitle => Pair::new(&self.en_subtitle, &self.ar_subtitle),
        }
    }

    fn fallback_key(field: HeroField) -> &'static str {
        match field {
            HeroField::Title => "brandName",
            HeroField::Tagline => "tagline",
            HeroField::Subtitle => "heroSubtitle",
        }
    }
}

impl ContentRecord for HeroContent {
    const TABLE: &'static str = "hero_content";
    const ENTITY: &'static str = "HeroContent";

    fn id(&self) -> DbId {
        self.id
    }
}

/// Payload for saving the hero banner. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct HeroInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200))]
    pub en_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200))]
    pub ar_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 300))]
    pub en_tagline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 300))]
    pub ar_tagline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub en_subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ar_subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
}

// ---------------------------------------------------------------------------
// About
// ---------------------------------------------------------------------------

/// One section of the about page, displayed in ascending id order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AboutSection {
    pub id: DbId,
    #[serde(default)]
    pub section_key: Option<String>,
    #[serde(default)]
    pub en_heading: Option<String>,
    #[serde(default)]
    pub ar_heading: Option<String>,
    #[serde(default)]
    pub en_text: Option<String>,
    #[serde(default)]
    pub ar_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AboutField {
    Heading,
    Text,
}

impl Bilingual for AboutSection {
    type Field = AboutField;

    fn pair(&self, field: AboutField) -> Pair<'_> {
        match field {
            AboutField::Heading => Pair::new(&self.en_heading, &self.ar_heading),
            AboutField::Text => Pair::new(&self.en_text, &self.ar_text),
        }
    }

    fn fallback_key(field: AboutField) -> &'static str {
        match field {
            AboutField::Heading => "aboutTitle",
            AboutField::Text => "aboutText",
        }
    }
}

impl ContentRecord for AboutSection {
    const TABLE: &'static str = "about_content";
    const ENTITY: &'static str = "AboutSection";

    fn id(&self) -> DbId {
        self.id
    }
}

/// Payload for editing an about section. The section key is immutable.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AboutUpdate {
    #[validate(length(min = 1, max = 200))]
    pub en_heading: String,
    #[validate(length(min = 1, max = 200))]
    pub ar_heading: String,
    pub en_text: String,
    pub ar_text: String,
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// A service card on listing pages, linked to its detail by `slug`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub id: DbId,
    pub slug: String,
    #[serde(default)]
    pub en_title: Option<String>,
    #[serde(default)]
    pub ar_title: Option<String>,
    #[serde(default)]
    pub en_description: Option<String>,
    #[serde(default)]
    pub ar_description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// The long-form page for one service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDetail {
    pub id: DbId,
    pub slug: String,
    #[serde(default)]
    pub en_title: Option<String>,
    #[serde(default)]
    pub ar_title: Option<String>,
    #[serde(default)]
    pub en_description: Option<String>,
    #[serde(default)]
    pub ar_description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceField {
    Title,
    Description,
}

fn service_fallback(field: ServiceField) -> &'static str {
    match field {
        ServiceField::Title => "servicesTitle",
        ServiceField::Description => "serviceDescription",
    }
}

impl Bilingual for ServiceSummary {
    type Field = ServiceField;

    fn pair(&self, field: ServiceField) -> Pair<'_> {
        match field {
            ServiceField::Title => Pair::new(&self.en_title, &self.ar_title),
            ServiceField::Description => Pair::new(&self.en_description, &self.ar_description),
        }
    }

    fn fallback_key(field: ServiceField) -> &'static str {
        service_fallback(field)
    }
}

impl Bilingual for ServiceDetail {
    type Field = ServiceField;

    fn pair(&self, field: ServiceField) -> Pair<'_> {
        match field {
            ServiceField::Title => Pair::new(&self.en_title, &self.ar_title),
            ServiceField::Description => Pair::new(&self.en_description, &self.ar_description),
        }
    }

    fn fallback_key(field: ServiceField) -> &'static str {
        service_fallback(field)
    }
}

impl ContentRecord for ServiceSummary {
    const TABLE: &'static str = "services";
    const ENTITY: &'static str = "Service";

    fn id(&self) -> DbId {
        self.id
    }
}

impl ContentRecord for ServiceDetail {
    const TABLE: &'static str = "service_details";
    const ENTITY: &'static str = "ServiceDetail";

    fn id(&self) -> DbId {
        self.id
    }
}

/// Payload for creating a service card or a service detail page.
///
/// When `slug` is omitted it is derived from the English title.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServiceInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 120))]
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub en_title: String,
    #[validate(length(min = 1, max = 200))]
    pub ar_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ar_description: Option<String>,
    #[validate(length(min = 1))]
    pub image_url: String,
}

/// Partial update of a service card or detail page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ServiceUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 120))]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub en_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub ar_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ar_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

/// Singleton contact block; the row with the largest id is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactContent {
    pub id: DbId,
    #[serde(default)]
    pub en_title: Option<String>,
    #[serde(default)]
    pub ar_title: Option<String>,
    #[serde(default)]
    pub en_description: Option<String>,
    #[serde(default)]
    pub ar_description: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address_en: Option<String>,
    #[serde(default)]
    pub address_ar: Option<String>,
    /// Raw map embed markup, passed through untouched.
    #[serde(default)]
    pub map_embed: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Title,
    Description,
    Address,
}

impl Bilingual for ContactContent {
    type Field = ContactField;

    fn pair(&self, field: ContactField) -> Pair<'_> {
        match field {
            ContactField::Title => Pair::new(&self.en_title, &self.ar_title),
            ContactField::Description => Pair::new(&self.en_description, &self.ar_description),
            ContactField::Address => Pair::new(&self.address_en, &self.address_ar),
        }
    }

    fn fallback_key(field: ContactField) -> &'static str {
        match field {
            ContactField::Title => "getInTouch",
            ContactField::Description => "contactDescription",
            ContactField::Address => "kuwaitCity",
        }
    }
}

impl ContentRecord for ContactContent {
    const TABLE: &'static str = "contact_content";
    const ENTITY: &'static str = "ContactContent";

    fn id(&self) -> DbId {
        self.id
    }
}

/// Payload for saving the contact block. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ContactInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ar_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ar_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_ar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_embed: Option<String>,
}
