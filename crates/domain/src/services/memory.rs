//! In-memory gateway and storage.
//!
//! Deterministic stand-ins for the hosted backend. Every call is recorded and
//! failures can be injected per operation, which is what the editor and
//! route tests assert against.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use super::gateway::{
    cell_text, Filter, GatewayError, ObjectStorage, OrderBy, Query, Row, TableGateway,
};

/// A gateway call as observed by [`InMemoryGateway`].
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Select { table: String },
    Insert { table: String },
    Update { table: String, id: String, patch: Row },
    Delete { table: String, id: String },
    Count { table: String, filters: Vec<Filter> },
}

#[derive(Default)]
struct Failures {
    update_at: Option<usize>,
    select: HashSet<String>,
    insert: HashSet<String>,
    delete: HashSet<String>,
    count: HashSet<String>,
}

#[derive(Default)]
struct State {
    tables: HashMap<String, Vec<Row>>,
    calls: Vec<GatewayCall>,
    updates_issued: usize,
    failures: Failures,
}

/// Table gateway backed by process memory.
#[derive(Default)]
pub struct InMemoryGateway {
    state: Mutex<State>,
}

fn injected(operation: &str, table: &str) -> GatewayError {
    GatewayError::Status {
        status: 500,
        message: format!("injected {} failure on {}", operation, table),
    }
}

fn matches(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| match filter {
        Filter::Eq(column, value) => {
            row.get(column).map(cell_text).as_deref() == Some(value.as_str())
        }
    })
}

fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

fn compare_rows(a: &Row, b: &Row, order: &[OrderBy]) -> Ordering {
    for key in order {
        let ordering = compare_cells(a.get(&key.column), b.get(&key.column));
        let ordering = if key.ascending {
            ordering
        } else {
            ordering.reverse()
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn row_id(row: &Row) -> Option<String> {
    row.get("id").map(cell_text)
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds `table` with JSON object rows; non-object values are skipped.
    pub fn with_rows(self, table: &str, rows: Vec<Value>) -> Self {
        self.seed(table, rows);
        self
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let rows: Vec<Row> = rows
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        let mut state = self.state.lock().unwrap();
        state.tables.entry(table.to_string()).or_default().extend(rows);
    }

    /// Current stored rows of `table` in storage order.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        let state = self.state.lock().unwrap();
        state.tables.get(table).cloned().unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn update_calls(&self) -> Vec<GatewayCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, GatewayCall::Update { .. }))
            .collect()
    }

    pub fn select_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, GatewayCall::Select { .. }))
            .count()
    }

    pub fn delete_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, GatewayCall::Delete { .. }))
            .count()
    }

    pub fn clear_calls(&self) {
        let mut state = self.state.lock().unwrap();
        state.calls.clear();
        state.updates_issued = 0;
    }

    /// Makes the `k`-th update call (1-indexed, counted since the last
    /// [`clear_calls`](Self::clear_calls)) fail without applying its patch.
    pub fn fail_update_at(&self, k: usize) {
        self.state.lock().unwrap().failures.update_at = Some(k);
    }

    pub fn fail_select(&self, table: &str) {
        self.state.lock().unwrap().failures.select.insert(table.to_string());
    }

    pub fn fail_insert(&self, table: &str) {
        self.state.lock().unwrap().failures.insert.insert(table.to_string());
    }

    pub fn fail_delete(&self, table: &str) {
        self.state.lock().unwrap().failures.delete.insert(table.to_string());
    }

    pub fn fail_count(&self, table: &str) {
        self.state.lock().unwrap().failures.count.insert(table.to_string());
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failures = Failures::default();
    }
}

#[async_trait]
impl TableGateway for InMemoryGateway {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(GatewayCall::Select {
            table: table.to_string(),
        });
        if state.failures.select.contains(table) {
            return Err(injected("select", table));
        }

        let mut rows: Vec<Row> = state
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches(row, &query.filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        rows.sort_by(|a, b| compare_rows(a, b, &query.order));
        Ok(rows)
    }

    async fn insert(&self, table: &str, mut row: Row) -> Result<Row, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(GatewayCall::Insert {
            table: table.to_string(),
        });
        if state.failures.insert.contains(table) {
            return Err(injected("insert", table));
        }

        row.entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        row.entry("created_at")
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
        state
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, id: &str, patch: Row) -> Result<Row, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(GatewayCall::Update {
            table: table.to_string(),
            id: id.to_string(),
            patch: patch.clone(),
        });
        state.updates_issued += 1;
        if state.failures.update_at == Some(state.updates_issued) {
            return Err(injected("update", table));
        }

        let row = state
            .tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|r| row_id(r).as_deref() == Some(id)))
            .ok_or_else(|| GatewayError::NotFound(format!("{}/{}", table, id)))?;
        for (key, value) in patch {
            row.insert(key, value);
        }
        Ok(row.clone())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(GatewayCall::Delete {
            table: table.to_string(),
            id: id.to_string(),
        });
        if state.failures.delete.contains(table) {
            return Err(injected("delete", table));
        }

        if let Some(rows) = state.tables.get_mut(table) {
            rows.retain(|r| row_id(r).as_deref() != Some(id));
        }
        Ok(())
    }

    async fn count(&self, table: &str, filters: &[Filter]) -> Result<u64, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(GatewayCall::Count {
            table: table.to_string(),
            filters: filters.to_vec(),
        });
        if state.failures.count.contains(table) {
            return Err(injected("count", table));
        }

        let count = state
            .tables
            .get(table)
            .map(|rows| rows.iter().filter(|row| matches(row, filters)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }
}

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Object storage backed by process memory.
#[derive(Default)]
pub struct InMemoryStorage {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    fail_uploads: Mutex<bool>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(&self, bucket: &str, path: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn fail_uploads(&self) {
        *self.fail_uploads.lock().unwrap() = true;
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        overwrite: bool,
    ) -> Result<(), GatewayError> {
        if *self.fail_uploads.lock().unwrap() {
            return Err(injected("upload", bucket));
        }

        let mut objects = self.objects.lock().unwrap();
        let key = (bucket.to_string(), path.to_string());
        if !overwrite && objects.contains_key(&key) {
            return Err(GatewayError::Status {
                status: 409,
                message: "The resource already exists".to_string(),
            });
        }
        objects.insert(
            key,
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://{}/{}", bucket, path)
    }
}
