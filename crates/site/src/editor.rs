//! Admin write side.
//!
//! Each operation reads what it needs, performs a single write against one
//! table or bucket, and publishes a change event so live pages refresh even
//! without the realtime bridge. There is no locking around remote writes.

use std::sync::Arc;

use beyond_core::content::{
    AboutSection, AboutUpdate, ContactContent, ContactInput, ContentRecord, HeroContent,
    HeroInput, ServiceDetail, ServiceInput, ServiceSummary, ServiceUpdate,
};
use beyond_core::error::CoreError;
use beyond_core::imaging::{self, CompressedImage};
use beyond_core::media::{self, buckets, PublicUrlSource};
use beyond_core::slug;
use beyond_core::types::{DbId, Timestamp};
use beyond_events::{ChangeBus, ChangeEvent, ChangeKind};
use beyond_store::{ContentFetcher, DataStore, ListOptions, ObjectStorage, StoreError, UploadOptions};
use serde::Serialize;
use serde_json::Value;
use validator::Validate;

use crate::error::{SiteError, UploadedImage};
use crate::gallery::Gallery;

/// Browser cache lifetime for uploaded images, in seconds.
const IMAGE_CACHE_SECONDS: u32 = 3600;

/// A file received from an admin upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Batch upload progress, reported after each stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UploadProgress {
    pub uploaded: usize,
    pub total: usize,
}

/// An object in a gallery bucket as the admin sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryImage {
    pub name: String,
    pub url: String,
    pub created_at: Option<Timestamp>,
}

/// Admin content operations.
#[derive(Clone)]
pub struct ContentEditor {
    fetcher: ContentFetcher,
    storage: Arc<dyn ObjectStorage>,
    bus: Arc<ChangeBus>,
}

impl ContentEditor {
    pub fn new(fetcher: ContentFetcher, storage: Arc<dyn ObjectStorage>, bus: Arc<ChangeBus>) -> Self {
        Self {
            fetcher,
            storage,
            bus,
        }
    }

    fn store(&self) -> &Arc<dyn DataStore> {
        self.fetcher.store()
    }

    fn publish(&self, table: &str, kind: ChangeKind) {
        self.bus.publish(ChangeEvent::new(table, kind));
    }

    // -----------------------------------------------------------------------
    // Generic row helpers
    // -----------------------------------------------------------------------

    async fn insert_record<T: ContentRecord>(&self, row: impl Serialize) -> Result<T, SiteError> {
        let row = serde_json::to_value(row).map_err(StoreError::Decode)?;
        let stored = self.store().insert(T::TABLE, row).await?;
        let record: T = serde_json::from_value(stored).map_err(StoreError::Decode)?;
        tracing::info!(table = T::TABLE, id = record.id(), "Row inserted");
        self.publish(T::TABLE, ChangeKind::Insert);
        Ok(record)
    }

    async fn update_record<T: ContentRecord>(
        &self,
        id: DbId,
        patch: impl Serialize,
    ) -> Result<T, SiteError> {
        let patch = serde_json::to_value(patch).map_err(StoreError::Decode)?;
        let stored = self
            .store()
            .update_by_id(T::TABLE, id, patch)
            .await?
            .ok_or_else(|| CoreError::not_found(T::ENTITY, id))?;
        let record: T = serde_json::from_value(stored).map_err(StoreError::Decode)?;
        tracing::info!(table = T::TABLE, id, "Row updated");
        self.publish(T::TABLE, ChangeKind::Update);
        Ok(record)
    }

    async fn delete_record<T: ContentRecord>(&self, id: DbId) -> Result<(), SiteError> {
        if !self.store().delete_by_id(T::TABLE, id).await? {
            return Err(CoreError::not_found(T::ENTITY, id).into());
        }
        tracing::info!(table = T::TABLE, id, "Row deleted");
        self.publish(T::TABLE, ChangeKind::Delete);
        Ok(())
    }

    /// Update the latest row of a singleton table, or insert the first one.
    async fn save_singleton<T: ContentRecord>(&self, patch: impl Serialize) -> Result<T, SiteError> {
        match self.fetcher.latest::<T>().await? {
            Some(current) => self.update_record(current.id(), patch).await,
            None => self.insert_record(patch).await,
        }
    }

    // -----------------------------------------------------------------------
    // Hero
    // -----------------------------------------------------------------------

    pub async fn hero(&self) -> Result<Option<HeroContent>, SiteError> {
        Ok(self.fetcher.latest().await?)
    }

    pub async fn save_hero(&self, input: HeroInput) -> Result<HeroContent, SiteError> {
        validate(&input)?;
        self.save_singleton(&input).await
    }

    /// Upload a new hero image, delete the previous object, and point the
    /// hero row at the new public URL.
    pub async fn replace_hero_image(&self, file: UploadFile) -> Result<HeroContent, SiteError> {
        let current: Option<HeroContent> = self.fetcher.latest().await?;
        let uploaded = self.store_image(buckets::HERO, "hero-", file, true).await?;

        let old_key = current
            .as_ref()
            .and_then(|h| h.hero_image.as_deref())
            .and_then(|raw| stored_key(raw, buckets::HERO));
        if let Some(old_key) = old_key.filter(|k| *k != uploaded.key) {
            if let Err(e) = self.storage.remove(buckets::HERO, &[old_key.clone()]).await {
                tracing::warn!(key = %old_key, error = %e, "Failed to delete previous hero image");
            }
        }

        let patch = HeroInput {
            hero_image: Some(uploaded.url),
            ..Default::default()
        };
        match current {
            Some(hero) => self.update_record(hero.id, &patch).await,
            None => self.insert_record(&patch).await,
        }
    }

    // -----------------------------------------------------------------------
    // About
    // -----------------------------------------------------------------------

    pub async fn about_sections(&self) -> Result<Vec<AboutSection>, SiteError> {
        Ok(self.fetcher.list(None).await?)
    }

    pub async fn update_about(&self, id: DbId, update: AboutUpdate) -> Result<AboutSection, SiteError> {
        validate(&update)?;
        self.update_record(id, &update).await
    }

    // -----------------------------------------------------------------------
    // Services and service details
    // -----------------------------------------------------------------------

    pub async fn services(&self) -> Result<Vec<ServiceSummary>, SiteError> {
        Ok(self.fetcher.list(None).await?)
    }

    pub async fn create_service(&self, input: ServiceInput) -> Result<ServiceSummary, SiteError> {
        let input = self.prepare_service::<ServiceSummary>(input).await?;
        self.insert_record(&input).await
    }

    pub async fn update_service(&self, id: DbId, update: ServiceUpdate) -> Result<ServiceSummary, SiteError> {
        self.check_update::<ServiceSummary>(id, &update).await?;
        self.update_record(id, &update).await
    }

    pub async fn delete_service(&self, id: DbId) -> Result<(), SiteError> {
        self.delete_record::<ServiceSummary>(id).await
    }

    pub async fn service_details(&self) -> Result<Vec<ServiceDetail>, SiteError> {
        Ok(self.fetcher.list(None).await?)
    }

    pub async fn create_service_detail(&self, input: ServiceInput) -> Result<ServiceDetail, SiteError> {
        let input = self.prepare_service::<ServiceDetail>(input).await?;
        self.insert_record(&input).await
    }

    pub async fn update_service_detail(
        &self,
        id: DbId,
        update: ServiceUpdate,
    ) -> Result<ServiceDetail, SiteError> {
        self.check_update::<ServiceDetail>(id, &update).await?;
        self.update_record(id, &update).await
    }

    /// Validate, fill in the slug, and reject a slug already taken in `T`'s
    /// table.
    async fn prepare_service<T: ContentRecord>(&self, mut input: ServiceInput) -> Result<ServiceInput, SiteError> {
        validate(&input)?;
        let slug = match input.slug.take().filter(|s| !s.trim().is_empty()) {
            Some(explicit) => {
                slug::validate_slug(&explicit)?;
                explicit
            }
            None => slug::slugify(&input.en_title)?,
        };
        self.ensure_slug_free::<T>(&slug, None).await?;
        input.slug = Some(slug);
        Ok(input)
    }

    async fn check_update<T: ContentRecord>(&self, id: DbId, update: &ServiceUpdate) -> Result<(), SiteError> {
        validate(update)?;
        if let Some(slug) = &update.slug {
            slug::validate_slug(slug)?;
            self.ensure_slug_free::<T>(slug, Some(id)).await?;
        }
        Ok(())
    }

    async fn ensure_slug_free<T: ContentRecord>(&self, slug: &str, except: Option<DbId>) -> Result<(), SiteError> {
        let rows = self
            .store()
            .select(&beyond_store::Query::from(T::TABLE).select("id").eq("slug", slug))
            .await?;
        let taken = rows
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_i64))
            .any(|id| Some(id) != except);
        if taken {
            return Err(CoreError::Conflict(format!("Slug '{slug}' is already used in {}", T::TABLE)).into());
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Contact
    // -----------------------------------------------------------------------

    pub async fn contact(&self) -> Result<Option<ContactContent>, SiteError> {
        Ok(self.fetcher.latest().await?)
    }

    pub async fn save_contact(&self, input: ContactInput) -> Result<ContactContent, SiteError> {
        validate(&input)?;
        self.save_singleton(&input).await
    }

    // -----------------------------------------------------------------------
    // Galleries and uploads
    // -----------------------------------------------------------------------

    pub async fn gallery_images(&self, gallery: Gallery) -> Result<Vec<GalleryImage>, SiteError> {
        let objects = self
            .storage
            .list(gallery.bucket(), "", &gallery.list_options())
            .await?;
        Ok(objects
            .into_iter()
            .filter(|o| o.is_file())
            .map(|o| GalleryImage {
                url: self.storage.public_url(gallery.bucket(), &o.name),
                name: o.name,
                created_at: o.created_at,
            })
            .collect())
    }

    /// Upload `files` one at a time. The first failure stops the batch;
    /// files stored before it stay stored.
    pub async fn upload_gallery(
        &self,
        gallery: Gallery,
        files: Vec<UploadFile>,
        mut progress: impl FnMut(UploadProgress) + Send,
    ) -> Result<Vec<UploadedImage>, SiteError> {
        let total = files.len();
        let mut uploaded: Vec<UploadedImage> = Vec::with_capacity(total);

        for file in files {
            let name = file.name.clone();
            let result = self.store_gallery_image(gallery, file).await;
            match result {
                Ok(image) => {
                    uploaded.push(image);
                    progress(UploadProgress {
                        uploaded: uploaded.len(),
                        total,
                    });
                    tracing::info!(
                        gallery = gallery.name(),
                        "Uploaded {} of {}",
                        uploaded.len(),
                        total
                    );
                }
                Err(e) => {
                    tracing::error!(
                        gallery = gallery.name(),
                        file = %name,
                        uploaded = uploaded.len(),
                        error = %e,
                        "Batch upload aborted",
                    );
                    if !uploaded.is_empty() {
                        self.publish(gallery.trigger_table(), ChangeKind::Insert);
                    }
                    return Err(SiteError::UploadFailed {
                        uploaded,
                        failed_file: name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if !uploaded.is_empty() {
            self.publish(gallery.trigger_table(), ChangeKind::Insert);
        }
        Ok(uploaded)
    }

    /// Store one gallery file. If its trigger row cannot be inserted, the
    /// object is removed again before the error is returned.
    async fn store_gallery_image(&self, gallery: Gallery, file: UploadFile) -> Result<UploadedImage, SiteError> {
        let image = self.store_image(gallery.bucket(), "", file, false).await?;
        if gallery.records_uploads() {
            let inserted = self
                .store()
                .insert(gallery.trigger_table(), serde_json::json!({ "image_url": image.url }))
                .await;
            if let Err(e) = inserted {
                if let Err(cleanup) = self.storage.remove(gallery.bucket(), &[image.key.clone()]).await {
                    tracing::warn!(
                        key = %image.key,
                        error = %cleanup,
                        "Failed to remove image after its row insert failed",
                    );
                }
                return Err(e.into());
            }
        }
        Ok(image)
    }

    pub async fn delete_gallery_image(&self, gallery: Gallery, name: &str) -> Result<(), SiteError> {
        let options = ListOptions {
            search: Some(name.to_string()),
            ..gallery.list_options()
        };
        let exists = self
            .storage
            .list(gallery.bucket(), "", &options)
            .await?
            .iter()
            .any(|o| o.name == name);
        if !exists {
            return Err(CoreError::not_found("GalleryImage", name).into());
        }

        self.storage.remove(gallery.bucket(), &[name.to_string()]).await?;

        if gallery.records_uploads() {
            let rows = self
                .store()
                .select(&beyond_store::Query::from(gallery.trigger_table()))
                .await?;
            let matching = rows.iter().filter(|r| {
                r.get("image_url")
                    .and_then(Value::as_str)
                    .and_then(|raw| stored_key(raw, gallery.bucket()))
                    .is_some_and(|key| key == name)
            });
            for id in matching.filter_map(|r| r.get("id").and_then(Value::as_i64)) {
                self.store().delete_by_id(gallery.trigger_table(), id).await?;
            }
        }

        tracing::info!(gallery = gallery.name(), name, "Gallery image deleted");
        self.publish(gallery.trigger_table(), ChangeKind::Delete);
        Ok(())
    }

    /// Compress and upload a single image into a known bucket.
    pub async fn upload_image(&self, bucket: &str, file: UploadFile) -> Result<UploadedImage, SiteError> {
        if !buckets::is_known(bucket) {
            return Err(CoreError::Validation(format!("Unknown bucket '{bucket}'")).into());
        }
        self.store_image(bucket, "", file, false).await
    }

    async fn store_image(
        &self,
        bucket: &str,
        prefix: &str,
        file: UploadFile,
        upsert: bool,
    ) -> Result<UploadedImage, SiteError> {
        let compressed = compress(file.bytes).await?;
        let key = imaging::object_key(prefix, &file.name, chrono::Utc::now().timestamp_millis());
        let options = UploadOptions {
            upsert,
            cache_control: Some(IMAGE_CACHE_SECONDS),
            content_type: Some(CompressedImage::CONTENT_TYPE.to_string()),
        };
        self.storage
            .upload(bucket, &key, compressed.bytes, &options)
            .await?;
        Ok(UploadedImage {
            bucket: bucket.to_string(),
            url: self.storage.public_url(bucket, &key),
            key,
        })
    }
}

/// Run image compression on the blocking pool.
async fn compress(bytes: Vec<u8>) -> Result<CompressedImage, SiteError> {
    let compressed = tokio::task::spawn_blocking(move || imaging::compress(&bytes)).await??;
    Ok(compressed)
}

fn validate(input: &impl Validate) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))
}

/// Object key of a stored image reference, URL or bare key.
fn stored_key(raw: &str, bucket: &str) -> Option<String> {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        media::object_key_from_url(raw, bucket)
    } else if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}
