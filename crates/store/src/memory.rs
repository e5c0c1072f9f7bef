//! In-process store implementations for tests and local development.
//!
//! Both types behave like their REST counterparts at the trait level,
//! including cardinality checks, ordering and id assignment, and can be
//! told to fail or slow down.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering as AtomicOrdering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use beyond_core::media::PublicUrlSource;
use beyond_core::types::DbId;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::data::DataStore;
use crate::error::StoreError;
use crate::query::{enforce_cardinality, Query, SortOrder};
use crate::storage::{ListOptions, ObjectStorage, SortColumn, StoredObject, UploadOptions};

fn unavailable() -> StoreError {
    StoreError::Api {
        status: 503,
        body: "store unavailable".into(),
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        // Nulls sort last, as in Postgres ascending order.
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

// ---------------------------------------------------------------------------
// MemoryDataStore
// ---------------------------------------------------------------------------

/// A [`DataStore`] over in-memory JSON rows.
#[derive(Default)]
pub struct MemoryDataStore {
    tables: RwLock<HashMap<String, Vec<Value>>>,
    next_id: AtomicI64,
    unavailable: AtomicBool,
    latency: Mutex<Option<Duration>>,
}

impl MemoryDataStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    /// Insert rows as-is. Rows without an `id` get one assigned.
    pub async fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        let mut tables = self.tables.write().await;
        let entry = tables.entry(table.to_string()).or_default();
        for row in rows {
            entry.push(self.with_id(row));
        }
    }

    /// Snapshot of a table, in insertion order.
    pub async fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .read()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Make every call fail with a 503 until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().unwrap_or_else(|e| e.into_inner()) = latency;
    }

    async fn gate(&self) -> Result<(), StoreError> {
        let latency = *self.latency.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }

    fn with_id(&self, mut row: Value) -> Value {
        if let Value::Object(map) = &mut row {
            match map.get("id").and_then(Value::as_i64) {
                Some(id) => {
                    self.next_id.fetch_max(id + 1, AtomicOrdering::SeqCst);
                }
                None => {
                    let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst).max(1);
                    map.insert("id".into(), Value::from(id));
                }
            }
        }
        row
    }
}

fn row_id(row: &Value) -> Option<DbId> {
    row.get("id").and_then(Value::as_i64)
}

#[async_trait]
impl DataStore for MemoryDataStore {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        self.gate().await?;
        let tables = self.tables.read().await;
        let mut rows: Vec<Value> = tables
            .get(&query.table)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();

        if let Some((column, order)) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare_values(a.get(column), b.get(column));
                match order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        enforce_cardinality(&query.table, query.cardinality, rows)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
        self.gate().await?;
        if !row.is_object() {
            return Err(StoreError::Api {
                status: 400,
                body: "row must be a JSON object".into(),
            });
        }
        let row = self.with_id(row);
        self.tables
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update_by_id(
        &self,
        table: &str,
        id: DbId,
        patch: Value,
    ) -> Result<Option<Value>, StoreError> {
        self.gate().await?;
        let Value::Object(patch) = patch else {
            return Err(StoreError::Api {
                status: 400,
                body: "patch must be a JSON object".into(),
            });
        };
        let mut tables = self.tables.write().await;
        let Some(row) = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|r| row_id(r) == Some(id)))
        else {
            return Ok(None);
        };
        if let Value::Object(map) = row {
            for (k, v) in patch {
                if k != "id" {
                    map.insert(k, v);
                }
            }
        }
        Ok(Some(row.clone()))
    }

    async fn delete_by_id(&self, table: &str, id: DbId) -> Result<bool, StoreError> {
        self.gate().await?;
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|r| row_id(r) != Some(id));
        Ok(rows.len() != before)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.gate().await
    }
}

// ---------------------------------------------------------------------------
// MemoryObjectStorage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct StoredBlob {
    bytes: Vec<u8>,
    object: StoredObject,
}

/// An [`ObjectStorage`] over in-memory buckets.
pub struct MemoryObjectStorage {
    base_url: String,
    buckets: RwLock<HashMap<String, BTreeMap<String, StoredBlob>>>,
    fail_matching: Mutex<Option<String>>,
}

impl MemoryObjectStorage {
    /// `base_url` is used for public URLs, e.g. `http://localhost:54321`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            buckets: RwLock::new(HashMap::new()),
            fail_matching: Mutex::new(None),
        }
    }

    /// Make uploads whose key contains `needle` fail.
    pub fn fail_uploads_matching(&self, needle: Option<&str>) {
        *self.fail_matching.lock().unwrap_or_else(|e| e.into_inner()) = needle.map(String::from);
    }

    /// Keys in `bucket`, sorted by name.
    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        self.buckets
            .read()
            .await
            .get(bucket)
            .map(|b| b.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn bytes(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.buckets
            .read()
            .await
            .get(bucket)
            .and_then(|b| b.get(key))
            .map(|blob| blob.bytes.clone())
    }
}

impl PublicUrlSource for MemoryObjectStorage {
    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{bucket}/{key}",
            self.base_url
        )
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<(), StoreError> {
        let failing = self
            .fail_matching
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if failing.is_some_and(|needle| key.contains(&needle)) {
            return Err(StoreError::Api {
                status: 500,
                body: format!("upload of {key} rejected"),
            });
        }

        let mut buckets = self.buckets.write().await;
        let objects = buckets.entry(bucket.to_string()).or_default();
        if objects.contains_key(key) && !options.upsert {
            return Err(StoreError::Api {
                status: 409,
                body: "The resource already exists".into(),
            });
        }
        let now = chrono::Utc::now();
        let created_at = objects
            .get(key)
            .and_then(|b| b.object.created_at)
            .unwrap_or(now);
        let object = StoredObject {
            name: key.to_string(),
            id: Some(uuid::Uuid::new_v4().to_string()),
            created_at: Some(created_at),
            updated_at: Some(now),
            metadata: Some(serde_json::json!({
                "size": bytes.len(),
                "mimetype": options.content_type,
            })),
        };
        objects.insert(key.to_string(), StoredBlob { bytes, object });
        Ok(())
    }

    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        options: &ListOptions,
    ) -> Result<Vec<StoredObject>, StoreError> {
        let buckets = self.buckets.read().await;
        let mut objects: Vec<StoredObject> = buckets
            .get(bucket)
            .map(|b| {
                b.values()
                    .filter(|blob| blob.object.name.starts_with(prefix))
                    .filter(|blob| {
                        options
                            .search
                            .as_deref()
                            .map_or(true, |text| blob.object.name.contains(text))
                    })
                    .map(|blob| blob.object.clone())
                    .collect()
            })
            .unwrap_or_default();

        let (column, order) = options.sort;
        objects.sort_by(|a, b| {
            let ord = match column {
                SortColumn::Name => a.name.cmp(&b.name),
                SortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
                SortColumn::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            };
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        Ok(objects
            .into_iter()
            .skip(options.offset)
            .take(options.limit)
            .collect())
    }

    async fn remove(&self, bucket: &str, keys: &[String]) -> Result<(), StoreError> {
        if let Some(objects) = self.buckets.write().await.get_mut(bucket) {
            for key in keys {
                objects.remove(key);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = MemoryDataStore::new();
        store.seed("services", [json!({ "id": 7, "slug": "a" })]).await;
        let row = store.insert("services", json!({ "slug": "b" })).await.unwrap();
        assert_eq!(row["id"], 8);
    }

    #[tokio::test]
    async fn select_orders_and_limits() {
        let store = MemoryDataStore::new();
        store
            .seed(
                "hero_content",
                [json!({ "id": 2 }), json!({ "id": 9 }), json!({ "id": 4 })],
            )
            .await;
        let query = Query::from("hero_content").order("id", SortOrder::Desc).limit(1);
        let rows = store.select(&query).await.unwrap();
        assert_eq!(rows, vec![json!({ "id": 9 })]);
    }

    #[tokio::test]
    async fn update_merges_and_keeps_id() {
        let store = MemoryDataStore::new();
        store.seed("about_content", [json!({ "id": 1, "en_heading": "Old" })]).await;
        let row = store
            .update_by_id("about_content", 1, json!({ "id": 99, "en_heading": "New" }))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row, json!({ "id": 1, "en_heading": "New" }));
        assert!(store
            .update_by_id("about_content", 5, json!({}))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn unavailable_store_errors() {
        let store = MemoryDataStore::new();
        store.set_unavailable(true);
        assert_matches!(store.ping().await, Err(StoreError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn upload_without_upsert_conflicts() {
        let storage = MemoryObjectStorage::new("http://localhost:54321");
        let opts = UploadOptions::default();
        storage.upload("hero-images", "a.jpg", vec![1], &opts).await.unwrap();
        assert_matches!(
            storage.upload("hero-images", "a.jpg", vec![2], &opts).await,
            Err(StoreError::Api { status: 409, .. })
        );
        let upsert = UploadOptions {
            upsert: true,
            ..Default::default()
        };
        storage.upload("hero-images", "a.jpg", vec![3], &upsert).await.unwrap();
        assert_eq!(storage.bytes("hero-images", "a.jpg").await, Some(vec![3]));
    }

    #[tokio::test]
    async fn list_sorts_by_name() {
        let storage = MemoryObjectStorage::new("http://localhost:54321");
        let opts = UploadOptions::default();
        for key in ["c.jpg", "a.jpg", "b.jpg"] {
            storage.upload("autoscroll-gallery", key, vec![0], &opts).await.unwrap();
        }
        let listed = storage
            .list("autoscroll-gallery", "", &ListOptions::default())
            .await
            .unwrap();
        let names: Vec<_> = listed.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[tokio::test]
    async fn list_search_narrows_by_name() {
        let storage = MemoryObjectStorage::new("http://localhost:54321");
        let opts = UploadOptions::default();
        for key in ["a.jpg", "b.jpg", "ab.jpg"] {
            storage.upload("project-images", key, vec![0], &opts).await.unwrap();
        }
        let options = ListOptions {
            limit: 1,
            search: Some("b.jpg".to_string()),
            ..Default::default()
        };
        let listed = storage.list("project-images", "", &options).await.unwrap();
        let names: Vec<_> = listed.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["ab.jpg"]);

        let options = ListOptions {
            search: Some("b.jpg".to_string()),
            ..Default::default()
        };
        let listed = storage.list("project-images", "", &options).await.unwrap();
        assert_eq!(listed.len(), 2);
    }
}
