//! Generic entity editor.
//!
//! One editor instance owns the local copy of one table view. The lifecycle
//! is load, mutate fields locally, then save. Saves replay rows through the
//! gateway one at a time in collection order and stop at the first failure;
//! rows already written stay written.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::entity::{EditorScope, Entity, ManagedEntity, Messages};
use super::gateway::{GatewayError, Row, TableGateway};
use super::notifier::{Confirm, Notifier};
use crate::models::Notice;

/// Errors returned by editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Collection has not been loaded")]
    NotLoaded,

    #[error("Row not found: {0}")]
    RowNotFound(String),

    #[error("Field is not editable: {0}")]
    FieldNotEditable(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Any gateway failure. `message` is the view's operation-specific text.
    #[error("{message}")]
    OperationFailed {
        message: String,
        #[source]
        source: GatewayError,
    },
}

impl EditorError {
    fn failed(message: &str, source: GatewayError) -> Self {
        EditorError::OperationFailed {
            message: message.to_string(),
            source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorStatus {
    Idle,
    Loading,
    Saving,
}

/// Outcome of [`EntityEditor::delete_one`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    Cancelled,
}

/// Load/edit/save controller for one collection of `E`.
pub struct EntityEditor<E: Entity> {
    gateway: Arc<dyn TableGateway>,
    scope: EditorScope,
    rows: Vec<E>,
    loaded: bool,
    status: EditorStatus,
}

impl<E: Entity> EntityEditor<E> {
    pub fn new(gateway: Arc<dyn TableGateway>) -> Self {
        Self::with_scope(gateway, E::default_scope())
    }

    pub fn with_scope(gateway: Arc<dyn TableGateway>, scope: EditorScope) -> Self {
        Self {
            gateway,
            scope,
            rows: Vec::new(),
            loaded: false,
            status: EditorStatus::Idle,
        }
    }

    pub fn rows(&self) -> &[E] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<E> {
        self.rows
    }

    pub fn get(&self, id: &str) -> Option<&E> {
        self.rows.iter().find(|row| row.id() == id)
    }

    pub fn status(&self) -> EditorStatus {
        self.status
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn messages(&self) -> &Messages {
        &self.scope.messages
    }

    /// Replaces the local collection with the rows of the scope.
    ///
    /// On failure the previous rows are kept and one error notice is raised.
    pub async fn load(&mut self, notifier: &dyn Notifier) -> Result<(), EditorError> {
        self.status = EditorStatus::Loading;
        let result = self.fetch().await;
        self.status = EditorStatus::Idle;

        match result {
            Ok(rows) => {
                debug!(table = E::TABLE, count = rows.len(), "Loaded rows");
                self.rows = rows;
                self.loaded = true;
                Ok(())
            }
            Err(source) => {
                warn!(table = E::TABLE, error = %source, "Failed to load rows");
                let message = self.scope.messages.load_failed;
                notifier.notify(Notice::error(message));
                Err(EditorError::failed(message, source))
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<E>, GatewayError> {
        let rows = self.gateway.select(E::TABLE, &self.scope.query()).await?;
        rows.into_iter()
            .map(|row| {
                serde_json::from_value(Value::Object(row))
                    .map_err(|e| GatewayError::Decode(e.to_string()))
            })
            .collect()
    }

    /// Sets one field of one local row. No gateway call is made.
    pub fn mutate_field(&mut self, id: &str, field: &str, value: Value) -> Result<(), EditorError> {
        if !self.loaded {
            return Err(EditorError::NotLoaded);
        }
        if !E::EDITABLE_FIELDS.contains(&field) {
            return Err(EditorError::FieldNotEditable(field.to_string()));
        }
        let index = self
            .rows
            .iter()
            .position(|row| row.id() == id)
            .ok_or_else(|| EditorError::RowNotFound(id.to_string()))?;

        let invalid = |reason: String| EditorError::InvalidValue {
            field: field.to_string(),
            reason,
        };

        let mut current = serde_json::to_value(&self.rows[index]).map_err(|e| invalid(e.to_string()))?;
        match current.as_object_mut() {
            Some(map) => {
                map.insert(field.to_string(), value);
            }
            None => return Err(invalid("row is not an object".to_string())),
        }
        let updated: E = serde_json::from_value(current).map_err(|e| invalid(e.to_string()))?;

        self.rows[index] = updated;
        Ok(())
    }

    /// Update patch for one row: editable fields plus `updated_at` when the
    /// entity tracks it.
    fn patch_for(row: &E) -> Result<Row, GatewayError> {
        let value = serde_json::to_value(row).map_err(|e| GatewayError::Decode(e.to_string()))?;
        let Value::Object(mut map) = value else {
            return Err(GatewayError::Decode("row is not an object".to_string()));
        };

        let mut patch = Row::new();
        for field in E::EDITABLE_FIELDS {
            if let Some(value) = map.remove(*field) {
                patch.insert((*field).to_string(), value);
            }
        }
        if E::TOUCHES_UPDATED_AT {
            patch.insert(
                "updated_at".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
        }
        Ok(patch)
    }

    async fn write_row(&self, row: &E) -> Result<(), GatewayError> {
        let patch = Self::patch_for(row)?;
        self.gateway.update(E::TABLE, row.id(), patch).await?;
        Ok(())
    }

    /// Writes every local row back in order, stopping at the first failure.
    ///
    /// Returns the number of rows written.
    pub async fn save_all(&mut self, notifier: &dyn Notifier) -> Result<usize, EditorError> {
        if !self.loaded {
            return Err(EditorError::NotLoaded);
        }

        self.status = EditorStatus::Saving;
        let mut written = 0;
        let mut failure = None;
        for row in &self.rows {
            if let Err(source) = self.write_row(row).await {
                failure = Some((row.id().to_string(), source));
                break;
            }
            written += 1;
        }
        self.status = EditorStatus::Idle;

        if let Some((id, source)) = failure {
            warn!(
                table = E::TABLE,
                id = %id,
                written,
                error = %source,
                "Save aborted"
            );
            let message = self.scope.messages.save_failed;
            notifier.notify(Notice::error(message));
            return Err(EditorError::failed(message, source));
        }

        info!(table = E::TABLE, count = written, "Saved rows");
        notifier.notify(Notice::success(self.scope.messages.saved));
        Ok(written)
    }

    /// Writes one local row back, then reloads the collection.
    pub async fn save_one(&mut self, id: &str, notifier: &dyn Notifier) -> Result<(), EditorError> {
        let row = self
            .get(id)
            .cloned()
            .ok_or_else(|| EditorError::RowNotFound(id.to_string()))?;

        self.status = EditorStatus::Saving;
        let result = self.write_row(&row).await;
        self.status = EditorStatus::Idle;

        if let Err(source) = result {
            warn!(table = E::TABLE, id = %id, error = %source, "Failed to save row");
            let message = self.scope.messages.save_failed;
            notifier.notify(Notice::error(message));
            return Err(EditorError::failed(message, source));
        }

        info!(table = E::TABLE, id = %id, "Saved row");
        notifier.notify(Notice::success(self.scope.messages.saved));
        self.reload(notifier).await;
        Ok(())
    }

    async fn reload(&mut self, notifier: &dyn Notifier) {
        if let Err(e) = self.load(notifier).await {
            warn!(table = E::TABLE, error = %e, "Reload after write failed");
        }
    }
}

impl<E: ManagedEntity> EntityEditor<E> {
    /// Inserts one row, then reloads so server-assigned fields are picked up.
    pub async fn create_one(
        &mut self,
        draft: &E::Draft,
        notifier: &dyn Notifier,
    ) -> Result<(), EditorError> {
        let message = self.scope.messages.create_failed;

        self.status = EditorStatus::Saving;
        let result = match serde_json::to_value(draft) {
            Ok(Value::Object(row)) => self.gateway.insert(E::TABLE, row).await,
            Ok(_) => Err(GatewayError::Decode("draft is not an object".to_string())),
            Err(e) => Err(GatewayError::Decode(e.to_string())),
        };
        self.status = EditorStatus::Idle;

        match result {
            Ok(row) => {
                info!(
                    table = E::TABLE,
                    id = ?row.get("id"),
                    "Created row"
                );
                notifier.notify(Notice::success(self.scope.messages.created));
                self.reload(notifier).await;
                Ok(())
            }
            Err(source) => {
                warn!(table = E::TABLE, error = %source, "Failed to create row");
                notifier.notify(Notice::error(message));
                Err(EditorError::failed(message, source))
            }
        }
    }

    /// Deletes one row after confirmation, then reloads.
    ///
    /// Nothing is sent to the gateway when the confirmation is declined.
    pub async fn delete_one(
        &mut self,
        id: &str,
        confirm: &dyn Confirm,
        notifier: &dyn Notifier,
    ) -> Result<Deletion, EditorError> {
        if !confirm.confirm(E::DELETE_PROMPT).await {
            debug!(table = E::TABLE, id = %id, "Delete cancelled");
            return Ok(Deletion::Cancelled);
        }

        self.status = EditorStatus::Saving;
        let result = self.gateway.delete(E::TABLE, id).await;
        self.status = EditorStatus::Idle;

        if let Err(source) = result {
            warn!(table = E::TABLE, id = %id, error = %source, "Failed to delete row");
            let message = self.scope.messages.delete_failed;
            notifier.notify(Notice::error(message));
            return Err(EditorError::failed(message, source));
        }

        info!(table = E::TABLE, id = %id, "Deleted row");
        notifier.notify(Notice::success(self.scope.messages.deleted));
        self.reload(notifier).await;
        Ok(Deletion::Deleted)
    }
}
