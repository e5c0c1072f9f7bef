//! Object storage port and its REST implementation.
//!
//! Objects live in named buckets. A gallery image *is* its object: there
//! is no row describing it, so listing a bucket is the read path.

use async_trait::async_trait;
use beyond_core::media::PublicUrlSource;
use beyond_core::types::Timestamp;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::query::SortOrder;

/// Storage-side placeholder object that marks an empty folder.
pub const EMPTY_FOLDER_PLACEHOLDER: &str = ".emptyFolderPlaceholder";

/// Options for a single upload.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Overwrite an existing object with the same key.
    pub upsert: bool,
    /// `Cache-Control` max-age in seconds.
    pub cache_control: Option<u32>,
    pub content_type: Option<String>,
}

/// Column a bucket listing is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    CreatedAt,
    UpdatedAt,
}

impl SortColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::CreatedAt => "created_at",
            SortColumn::UpdatedAt => "updated_at",
        }
    }
}

/// Options for listing a bucket.
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub limit: usize,
    pub offset: usize,
    pub sort: (SortColumn, SortOrder),
    /// Only names containing this text.
    pub search: Option<String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            limit: 100,
            offset: 0,
            sort: (SortColumn::Name, SortOrder::Asc),
            search: None,
        }
    }
}

/// One entry of a bucket listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObject {
    pub name: String,
    /// `None` for folders.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl StoredObject {
    /// Whether this entry is a real file (not a folder or placeholder).
    pub fn is_file(&self) -> bool {
        self.id.is_some() && self.name != EMPTY_FOLDER_PLACEHOLDER
    }
}

/// Bucketed blob storage.
#[async_trait]
pub trait ObjectStorage: PublicUrlSource {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<(), StoreError>;

    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        options: &ListOptions,
    ) -> Result<Vec<StoredObject>, StoreError>;

    async fn remove(&self, bucket: &str, keys: &[String]) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// REST implementation
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ListBody<'a> {
    prefix: &'a str,
    limit: usize,
    offset: usize,
    #[serde(rename = "sortBy")]
    sort_by: SortBy,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
}

#[derive(Serialize)]
struct SortBy {
    column: &'static str,
    order: &'static str,
}

#[derive(Serialize)]
struct RemoveBody<'a> {
    prefixes: &'a [String],
}

/// HTTP client for `{url}/storage/v1`.
pub struct RestObjectStorage {
    client: reqwest::Client,
    base: Url,
    read_key: String,
    write_key: String,
}

impl RestObjectStorage {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &StoreConfig) -> Result<Self, StoreError> {
        let base = Url::parse(&config.url)
            .map_err(|e| StoreError::Config(format!("invalid store URL '{}': {e}", config.url)))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::Config(format!(
                "store URL '{}' cannot carry a path",
                config.url
            )));
        }
        Ok(Self {
            client,
            base,
            read_key: config.anon_key.clone(),
            write_key: config.write_key().to_string(),
        })
    }

    /// `{base}/storage/v1/object/{section...}/{key segments}` with each
    /// segment percent-encoded.
    fn object_url(&self, section: &[&str], key: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["storage", "v1", "object"])
                .extend(section)
                .extend(key.split('/').filter(|s| !s.is_empty()));
        }
        url
    }

    fn authorize(&self, builder: reqwest::RequestBuilder, key: &str) -> reqwest::RequestBuilder {
        builder
            .header("apikey", key)
            .header(AUTHORIZATION, format!("Bearer {key}"))
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StoreError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

impl PublicUrlSource for RestObjectStorage {
    fn public_url(&self, bucket: &str, key: &str) -> String {
        self.object_url(&["public", bucket], key).to_string()
    }
}

#[async_trait]
impl ObjectStorage for RestObjectStorage {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<(), StoreError> {
        let size = bytes.len();
        let mut request = self
            .authorize(self.client.post(self.object_url(&[bucket], key)), &self.write_key)
            .header("x-upsert", if options.upsert { "true" } else { "false" })
            .body(bytes);
        if let Some(max_age) = options.cache_control {
            request = request.header(CACHE_CONTROL, format!("max-age={max_age}"));
        }
        if let Some(content_type) = &options.content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        Self::ensure_success(request.send().await?).await?;
        tracing::info!(bucket, key, size, "Object uploaded");
        Ok(())
    }

    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        options: &ListOptions,
    ) -> Result<Vec<StoredObject>, StoreError> {
        let body = ListBody {
            prefix,
            limit: options.limit,
            offset: options.offset,
            sort_by: SortBy {
                column: options.sort.0.as_str(),
                order: options.sort.1.as_str(),
            },
            search: options.search.as_deref(),
        };
        let response = self
            .authorize(self.client.post(self.object_url(&["list", bucket], "")), &self.read_key)
            .json(&body)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<Vec<StoredObject>>().await?)
    }

    async fn remove(&self, bucket: &str, keys: &[String]) -> Result<(), StoreError> {
        if keys.is_empty() {
            return Ok(());
        }
        let response = self
            .authorize(self.client.delete(self.object_url(&[bucket], "")), &self.write_key)
            .json(&RemoveBody { prefixes: keys })
            .send()
            .await?;
        Self::ensure_success(response).await?;
        tracing::info!(bucket, count = keys.len(), "Objects removed");
        Ok(())
    }
}
