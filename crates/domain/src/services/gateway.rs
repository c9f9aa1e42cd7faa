//! Remote table gateway boundary.
//!
//! The backend is a hosted relational store reached through a generic
//! query/update/delete interface over named tables. Nothing here knows about
//! a concrete transport; implementations live in the persistence crate.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// One table row as returned by the gateway.
pub type Row = serde_json::Map<String, Value>;

/// Error returned by gateway calls.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Row not found: {0}")]
    NotFound(String),
}

/// Equality filter on one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq(String, String),
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Eq(column.into(), value.into())
    }

    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(column, _) => column,
        }
    }
}

/// Sort key for a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// Filters and ordering for a select call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Vec<OrderBy>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, order: OrderBy) -> Self {
        self.order.push(order);
        self
    }
}

/// Generic table access.
///
/// There are no cross-table transactions; every call stands alone.
#[async_trait]
pub trait TableGateway: Send + Sync {
    /// Returns all rows of `table` matching `query`, in the requested order.
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, GatewayError>;

    /// Inserts one row and returns it with server-assigned fields filled in.
    async fn insert(&self, table: &str, row: Row) -> Result<Row, GatewayError>;

    /// Applies `patch` to the row identified by `id` and returns the stored row.
    async fn update(&self, table: &str, id: &str, patch: Row) -> Result<Row, GatewayError>;

    /// Deletes the row identified by `id`.
    async fn delete(&self, table: &str, id: &str) -> Result<(), GatewayError>;

    /// Counts rows of `table` matching `filters`.
    async fn count(&self, table: &str, filters: &[Filter]) -> Result<u64, GatewayError>;
}

/// Public file storage used for branding images.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        overwrite: bool,
    ) -> Result<(), GatewayError>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Renders a JSON cell the way filters compare it: strings verbatim, others as JSON text.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_builder() {
        let query = Query::new()
            .filter(Filter::eq("category", "seo"))
            .order(OrderBy::asc("setting_key"))
            .order(OrderBy::desc("created_at"));

        assert_eq!(query.filters, vec![Filter::eq("category", "seo")]);
        assert_eq!(query.order.len(), 2);
        assert!(query.order[0].ascending);
        assert!(!query.order[1].ascending);
        assert_eq!(query.filters[0].column(), "category");
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!("new")), "new");
        assert_eq!(cell_text(&json!(3)), "3");
        assert_eq!(cell_text(&json!(true)), "true");
    }

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::Status {
            status: 401,
            message: "JWT expired".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned 401: JWT expired");
        assert_eq!(
            GatewayError::InvalidIdentifier("bad;table".to_string()).to_string(),
            "Invalid identifier: bad;table"
        );
    }
}
