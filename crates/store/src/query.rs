//! Read query builder rendered to PostgREST query parameters.

use serde_json::Value;

use crate::error::StoreError;

/// How many rows a query is expected to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cardinality {
    #[default]
    Many,
    /// Exactly one row; anything else is an error.
    Single,
    /// Zero or one row; more than one is an error.
    MaybeSingle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// A read against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub columns: String,
    pub filters: Vec<(String, String)>,
    pub order: Option<(String, SortOrder)>,
    pub limit: Option<usize>,
    pub cardinality: Cardinality,
}

impl Query {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: "*".into(),
            filters: Vec::new(),
            order: None,
            limit: None,
            cardinality: Cardinality::Many,
        }
    }

    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push((column.into(), value.to_string()));
        self
    }

    pub fn order(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.order = Some((column.into(), order));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn single(mut self) -> Self {
        self.cardinality = Cardinality::Single;
        self
    }

    pub fn maybe_single(mut self) -> Self {
        self.cardinality = Cardinality::MaybeSingle;
        self
    }

    /// Render as PostgREST query parameters.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.columns.clone())];
        for (column, value) in &self.filters {
            pairs.push((column.clone(), format!("eq.{value}")));
        }
        if let Some((column, order)) = &self.order {
            pairs.push(("order".into(), format!("{column}.{}", order.as_str())));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".into(), limit.to_string()));
        }
        pairs
    }

    /// Whether `row` satisfies every equality filter.
    ///
    /// Values compare by their textual form, matching how the filters
    /// travel on the wire.
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|(column, expected)| match row.get(column) {
            Some(Value::String(s)) => s == expected,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string() == *expected,
        })
    }
}

/// Enforce `cardinality` on a result set.
pub fn enforce_cardinality(
    table: &str,
    cardinality: Cardinality,
    rows: Vec<Value>,
) -> Result<Vec<Value>, StoreError> {
    match (cardinality, rows.len()) {
        (Cardinality::Many, _) => Ok(rows),
        (Cardinality::Single, 1) | (Cardinality::MaybeSingle, 0 | 1) => Ok(rows),
        (Cardinality::Single, n) => Err(StoreError::Cardinality(format!(
            "expected exactly one row from {table}, got {n}"
        ))),
        (Cardinality::MaybeSingle, n) => Err(StoreError::Cardinality(format!(
            "expected at most one row from {table}, got {n}"
        ))),
    }
}
