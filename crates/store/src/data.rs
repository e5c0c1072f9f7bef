//! Row store port and typed content reads.

use std::sync::Arc;

use async_trait::async_trait;
use beyond_core::content::ContentRecord;
use beyond_core::types::DbId;
use serde_json::Value;

use crate::error::StoreError;
use crate::query::{Query, SortOrder};

/// Rows as JSON objects, keyed by table.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError>;

    /// Insert one row and return it as stored (with its id).
    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError>;

    /// Merge `patch` into the row with `id`. `None` when no row matched.
    async fn update_by_id(
        &self,
        table: &str,
        id: DbId,
        patch: Value,
    ) -> Result<Option<Value>, StoreError>;

    /// Delete the row with `id`. `false` when no row matched.
    async fn delete_by_id(&self, table: &str, id: DbId) -> Result<bool, StoreError>;

    /// Cheap reachability check.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Typed reads over a [`DataStore`].
#[derive(Clone)]
pub struct ContentFetcher {
    store: Arc<dyn DataStore>,
}

impl ContentFetcher {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DataStore> {
        &self.store
    }

    /// The row with the largest id, if any. Singleton tables are
    /// last-write-wins.
    pub async fn latest<T: ContentRecord>(&self) -> Result<Option<T>, StoreError> {
        let query = Query::from(T::TABLE)
            .order("id", SortOrder::Desc)
            .limit(1)
            .maybe_single();
        let rows = self.store.select(&query).await?;
        rows.into_iter().next().map(decode).transpose()
    }

    /// Every row (or the first `limit`), in ascending id order.
    pub async fn list<T: ContentRecord>(&self, limit: Option<usize>) -> Result<Vec<T>, StoreError> {
        let mut query = Query::from(T::TABLE).order("id", SortOrder::Asc);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        let rows = self.store.select(&query).await?;
        let mut records = rows.into_iter().map(decode).collect::<Result<Vec<T>, _>>()?;
        records.sort_by_key(|r| r.id());
        Ok(records)
    }

    /// The row whose `column` equals `value`. More than one match is a
    /// cardinality error.
    pub async fn find_by<T: ContentRecord>(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Option<T>, StoreError> {
        let query = Query::from(T::TABLE).eq(column, value).maybe_single();
        let rows = self.store.select(&query).await?;
        rows.into_iter().next().map(decode).transpose()
    }

    pub async fn by_id<T: ContentRecord>(&self, id: DbId) -> Result<Option<T>, StoreError> {
        let query = Query::from(T::TABLE).eq("id", id).maybe_single();
        let rows = self.store.select(&query).await?;
        rows.into_iter().next().map(decode).transpose()
    }
}

fn decode<T: ContentRecord>(row: Value) -> Result<T, StoreError> {
    serde_json::from_value(row).map_err(|e| {
        tracing::warn!(table = T::TABLE, error = %e, "Row failed to decode");
        StoreError::Decode(e)
    })
}
