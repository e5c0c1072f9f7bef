//! ContentFetcher behaviour over the in-memory store.

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use beyond_core::content::{AboutSection, ContactContent, HeroContent, ServiceDetail};
use beyond_core::types::DbId;
use beyond_store::memory::MemoryDataStore;
use beyond_store::{ContentFetcher, DataStore, Query, StoreError};
use serde_json::{json, Value};

async fn fetcher_with(store: MemoryDataStore) -> ContentFetcher {
    ContentFetcher::new(Arc::new(store))
}

// ---------------------------------------------------------------------------
// Test: singleton tables resolve to the largest id
// ---------------------------------------------------------------------------

#[tokio::test]
async fn latest_picks_largest_id() {
    let store = MemoryDataStore::new();
    store
        .seed(
            "hero_content",
            [
                json!({ "id": 3, "en_title": "Third" }),
                json!({ "id": 11, "en_title": "Eleventh" }),
                json!({ "id": 7, "en_title": "Seventh" }),
            ],
        )
        .await;
    let fetcher = fetcher_with(store).await;

    let hero: HeroContent = fetcher.latest().await.unwrap().unwrap();
    assert_eq!(hero.id, 11);
    assert_eq!(hero.en_title.as_deref(), Some("Eleventh"));
}

#[tokio::test]
async fn latest_on_empty_table_is_none() {
    let fetcher = fetcher_with(MemoryDataStore::new()).await;
    let contact: Option<ContactContent> = fetcher.latest().await.unwrap();
    assert!(contact.is_none());
}

// ---------------------------------------------------------------------------
// Test: lists come back in ascending id order
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_is_ascending_by_id() {
    let store = MemoryDataStore::new();
    store
        .seed(
            "about_content",
            [json!({ "id": 5 }), json!({ "id": 1 }), json!({ "id": 3 })],
        )
        .await;
    let fetcher = fetcher_with(store).await;

    let sections: Vec<AboutSection> = fetcher.list(None).await.unwrap();
    let ids: Vec<_> = sections.iter().map(|s| s.id).collect();
    assert_eq!(ids, [1, 3, 5]);

    let limited: Vec<AboutSection> = fetcher.list(Some(2)).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].id, 1);
}

/// Returns its rows in a fixed order whatever the query asks for.
struct UnorderedStore {
    rows: Vec<Value>,
}

#[async_trait]
impl DataStore for UnorderedStore {
    async fn select(&self, _query: &Query) -> Result<Vec<Value>, StoreError> {
        Ok(self.rows.clone())
    }

    async fn insert(&self, _table: &str, row: Value) -> Result<Value, StoreError> {
        Ok(row)
    }

    async fn update_by_id(&self, _table: &str, _id: DbId, _patch: Value) -> Result<Option<Value>, StoreError> {
        Ok(None)
    }

    async fn delete_by_id(&self, _table: &str, _id: DbId) -> Result<bool, StoreError> {
        Ok(false)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[tokio::test]
async fn list_sorts_rows_the_store_returns_out_of_order() {
    let store = UnorderedStore {
        rows: vec![json!({ "id": 9 }), json!({ "id": 2 }), json!({ "id": 4 })],
    };
    let fetcher = ContentFetcher::new(Arc::new(store));

    let sections: Vec<AboutSection> = fetcher.list(None).await.unwrap();
    let ids: Vec<_> = sections.iter().map(|s| s.id).collect();
    assert_eq!(ids, [2, 4, 9]);
}

// ---------------------------------------------------------------------------
// Test: lookup by slug
// ---------------------------------------------------------------------------

#[tokio::test]
async fn find_by_slug() {
    let store = MemoryDataStore::new();
    store
        .seed(
            "service_details",
            [
                json!({ "id": 1, "slug": "interior", "en_title": "Interior" }),
                json!({ "id": 2, "slug": "landscape", "en_title": "Landscape" }),
            ],
        )
        .await;
    let fetcher = fetcher_with(store).await;

    let detail: ServiceDetail = fetcher.find_by("slug", "landscape").await.unwrap().unwrap();
    assert_eq!(detail.id, 2);
    let missing: Option<ServiceDetail> = fetcher.find_by("slug", "pool").await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn duplicate_slug_is_cardinality_error() {
    let store = MemoryDataStore::new();
    store
        .seed(
            "service_details",
            [
                json!({ "id": 1, "slug": "interior" }),
                json!({ "id": 2, "slug": "interior" }),
            ],
        )
        .await;
    let fetcher = fetcher_with(store).await;

    let result: Result<Option<ServiceDetail>, _> = fetcher.find_by("slug", "interior").await;
    assert_matches!(result, Err(StoreError::Cardinality(_)));
}

// ---------------------------------------------------------------------------
// Test: failures surface as values
// ---------------------------------------------------------------------------

#[tokio::test]
async fn store_failure_is_returned_not_panicked() {
    let store = MemoryDataStore::new();
    store.set_unavailable(true);
    let fetcher = fetcher_with(store).await;

    let result: Result<Option<HeroContent>, _> = fetcher.latest().await;
    assert_matches!(result, Err(StoreError::Api { status: 503, .. }));
}

#[tokio::test]
async fn malformed_row_is_decode_error() {
    let store = MemoryDataStore::new();
    store
        .seed("service_details", [json!({ "id": 1, "slug": 42 })])
        .await;
    let fetcher = fetcher_with(store).await;

    let result: Result<Option<ServiceDetail>, _> = fetcher.by_id(1).await;
    assert_matches!(result, Err(StoreError::Decode(_)));
}
