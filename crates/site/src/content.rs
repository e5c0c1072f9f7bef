//! Read side: fetch content and resolve it into page views.

use std::sync::Arc;

use beyond_core::content::{AboutSection, ContactContent, HeroContent, ServiceDetail, ServiceSummary};
use beyond_core::i18n;
use beyond_core::language::Language;
use beyond_core::media::ImageResolver;
use beyond_store::{ContentFetcher, ObjectStorage};

use crate::error::SiteError;
use crate::gallery::Gallery;
use crate::pages::{PageView, SitePage};
use crate::views::{
    AboutView, ContactView, GalleryImageView, GalleryView, HeroView, ServiceCardView,
    ServiceDetailView, ServicesView,
};

/// Renders site pages from the remote store. Never writes.
#[derive(Clone)]
pub struct SiteContent {
    fetcher: ContentFetcher,
    storage: Arc<dyn ObjectStorage>,
    images: ImageResolver,
}

impl SiteContent {
    pub fn new(fetcher: ContentFetcher, storage: Arc<dyn ObjectStorage>, images: ImageResolver) -> Self {
        Self {
            fetcher,
            storage,
            images,
        }
    }

    pub fn images(&self) -> &ImageResolver {
        &self.images
    }

    /// Render `page` in `lang`. `Ok(None)` means there is nothing to show.
    pub async fn render(&self, page: &SitePage, lang: Language) -> Result<Option<PageView>, SiteError> {
        let view = match page {
            SitePage::Hero => self.hero(lang).await?.map(PageView::Hero),
            SitePage::About => self.about(lang).await?.map(PageView::About),
            SitePage::Services { limit } => self.services(lang, *limit).await?.map(PageView::Services),
            SitePage::ServiceDetail { slug } => self
                .service_detail(slug, lang)
                .await?
                .map(PageView::ServiceDetail),
            SitePage::Contact => self.contact(lang).await?.map(PageView::Contact),
            SitePage::Portfolio => self.gallery(Gallery::Portfolio, lang).await?.map(PageView::Gallery),
            SitePage::Gallery => self.gallery(Gallery::Autoscroll, lang).await?.map(PageView::Gallery),
        };
        Ok(view)
    }

    pub async fn hero(&self, lang: Language) -> Result<Option<HeroView>, SiteError> {
        let hero: Option<HeroContent> = self.fetcher.latest().await?;
        Ok(hero.map(|h| HeroView::build(&h, lang, &self.images)))
    }

    pub async fn about(&self, lang: Language) -> Result<Option<AboutView>, SiteError> {
        let sections: Vec<AboutSection> = self.fetcher.list(None).await?;
        if sections.is_empty() {
            return Ok(None);
        }
        Ok(Some(AboutView::build(&sections, lang)))
    }

    pub async fn services(
        &self,
        lang: Language,
        limit: Option<usize>,
    ) -> Result<Option<ServicesView>, SiteError> {
        let services: Vec<ServiceSummary> = self.fetcher.list(limit).await?;
        if services.is_empty() {
            return Ok(None);
        }
        Ok(Some(ServicesView {
            title: i18n::t(lang, "servicesTitle").to_string(),
            cards: services
                .iter()
                .map(|s| ServiceCardView::build(s, lang, &self.images))
                .collect(),
        }))
    }

    pub async fn service_detail(
        &self,
        slug: &str,
        lang: Language,
    ) -> Result<Option<ServiceDetailView>, SiteError> {
        let detail: Option<ServiceDetail> = self.fetcher.find_by("slug", slug).await?;
        Ok(detail.map(|d| ServiceDetailView::build(&d, lang, &self.images)))
    }

    pub async fn contact(&self, lang: Language) -> Result<Option<ContactView>, SiteError> {
        let contact: Option<ContactContent> = self.fetcher.latest().await?;
        Ok(contact.map(|c| ContactView::build(&c, lang)))
    }

    pub async fn gallery(&self, gallery: Gallery, lang: Language) -> Result<Option<GalleryView>, SiteError> {
        let objects = self
            .storage
            .list(gallery.bucket(), "", &gallery.list_options())
            .await?;
        let images: Vec<GalleryImageView> = objects
            .into_iter()
            .filter(|o| o.is_file())
            .map(|o| GalleryImageView {
                url: self.images.resolve(Some(&o.name), gallery.bucket()),
                name: o.name,
                created_at: o.created_at,
            })
            .collect();
        if images.is_empty() {
            return Ok(None);
        }
        let title_key = match gallery {
            Gallery::Portfolio => "portfolio",
            Gallery::Autoscroll => "latestProjects",
        };
        Ok(Some(GalleryView {
            title: i18n::t(lang, title_key).to_string(),
            images,
        }))
    }
}
