//! PostgREST client for the hosted row store.
//!
//! Reads authenticate with the anon key. Writes use the service role key
//! when one is configured and always ask for the stored representation
//! back.

use async_trait::async_trait;
use beyond_core::types::DbId;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::Value;

use crate::config::StoreConfig;
use crate::data::DataStore;
use crate::error::StoreError;
use crate::query::{enforce_cardinality, Cardinality, Query};

/// Media type asking PostgREST to return a single object.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Header asking PostgREST to echo written rows.
const RETURN_REPRESENTATION: &str = "return=representation";

/// HTTP client for `{url}/rest/v1`.
pub struct RestDataStore {
    client: reqwest::Client,
    rest_url: String,
    anon_key: String,
    write_key: String,
}

impl RestDataStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client, config: &StoreConfig) -> Self {
        Self {
            client,
            rest_url: config.rest_url(),
            anon_key: config.anon_key.clone(),
            write_key: config.write_key().to_string(),
        }
    }

    fn read(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.anon_key))
    }

    fn write(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.write_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.write_key))
            .header("Prefer", RETURN_REPRESENTATION)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    fn id_filter(id: DbId) -> [(&'static str, String); 1] {
        [("id", format!("eq.{id}"))]
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`StoreError::Api`] carrying
    /// the status and body text on failure.
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

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl DataStore for RestDataStore {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        let mut request = self
            .read(self.client.get(self.table_url(&query.table)))
            .query(&query.to_query_pairs());

        if query.cardinality == Cardinality::Single {
            request = request.header(ACCEPT, SINGLE_OBJECT);
            let response = request.send().await?;
            // PostgREST answers 406 when single-object coercion fails.
            if response.status() == reqwest::StatusCode::NOT_ACCEPTABLE {
                let body = response.text().await.unwrap_or_default();
                return Err(StoreError::Cardinality(format!(
                    "expected exactly one row from {}: {body}",
                    query.table
                )));
            }
            let row: Value = Self::parse_response(response).await?;
            return Ok(vec![row]);
        }

        let response = request.send().await?;
        let rows: Vec<Value> = Self::parse_response(response).await?;
        tracing::trace!(table = %query.table, rows = rows.len(), "Rows fetched");
        enforce_cardinality(&query.table, query.cardinality, rows)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
        let response = self
            .write(self.client.post(self.table_url(table)))
            .json(&row)
            .send()
            .await?;
        let rows: Vec<Value> = Self::parse_response(response).await?;
        rows.into_iter().next().ok_or_else(|| {
            StoreError::Cardinality(format!("insert into {table} returned no row"))
        })
    }

    async fn update_by_id(
        &self,
        table: &str,
        id: DbId,
        patch: Value,
    ) -> Result<Option<Value>, StoreError> {
        let response = self
            .write(self.client.patch(self.table_url(table)))
            .query(&Self::id_filter(id))
            .json(&patch)
            .send()
            .await?;
        let rows: Vec<Value> = Self::parse_response(response).await?;
        Ok(rows.into_iter().next())
    }

    async fn delete_by_id(&self, table: &str, id: DbId) -> Result<bool, StoreError> {
        let response = self
            .write(self.client.delete(self.table_url(table)))
            .query(&Self::id_filter(id))
            .send()
            .await?;
        let rows: Vec<Value> = Self::parse_response(response).await?;
        Ok(!rows.is_empty())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let response = self
            .read(self.client.get(format!("{}/", self.rest_url)))
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}
