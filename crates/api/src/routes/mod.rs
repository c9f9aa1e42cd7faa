//! API route handlers.
//!
//! Admin views are thin wrappers around [`EntityEditor`]: every request
//! loads a fresh collection, applies the requested changes and returns the
//! resulting rows with the notices raised along the way.

pub mod admin_auth;
pub mod admin_content;
pub mod admin_dashboard;
pub mod admin_faqs;
pub mod admin_packages;
pub mod admin_settings;
pub mod admin_submissions;
pub mod admin_uploads;
pub mod forms;
pub mod health;
pub mod site;

use domain::models::Notice;
use domain::services::{Deletion, Entity, EntityEditor, ManagedEntity, RecordingNotifier};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Body of an editor response.
#[derive(Debug, Serialize)]
pub struct EditorResponse<T> {
    pub items: T,
    pub notices: Vec<Notice>,
}

impl<T> EditorResponse<T> {
    pub fn new(items: T, notifier: &RecordingNotifier) -> Self {
        Self {
            items,
            notices: notifier.take(),
        }
    }
}

/// One local field edit.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldChange {
    pub id: String,
    pub field: String,
    pub value: Value,
}

/// Body of the bulk-save endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeSet {
    pub changes: Vec<FieldChange>,
}

/// Body of the single-row update endpoints: field name to new value.
pub type RowPatch = serde_json::Map<String, Value>;

/// `?confirm=true` answers the delete prompt.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// Loads `editor`, applies `changes` locally and saves every row.
///
/// A rejected change aborts before anything is written.
pub async fn apply_and_save<E: Entity>(
    editor: &mut EntityEditor<E>,
    changes: Vec<FieldChange>,
    notifier: &RecordingNotifier,
) -> Result<(), ApiError> {
    editor.load(notifier).await?;
    for change in changes {
        editor.mutate_field(&change.id, &change.field, change.value)?;
    }
    editor.save_all(notifier).await?;
    Ok(())
}

/// Loads `editor`, applies `patch` to row `id` and saves only that row.
pub async fn patch_and_save<E: Entity>(
    editor: &mut EntityEditor<E>,
    id: &str,
    patch: RowPatch,
    notifier: &RecordingNotifier,
) -> Result<(), ApiError> {
    editor.load(notifier).await?;
    for (field, value) in patch {
        editor.mutate_field(id, &field, value)?;
    }
    editor.save_one(id, notifier).await?;
    Ok(())
}

/// Deletes row `id` when `confirm` is set.
///
/// An unconfirmed request answers with the entity's delete prompt and sends
/// nothing to the backend.
pub async fn delete_confirmed<E: ManagedEntity>(
    editor: &mut EntityEditor<E>,
    id: &str,
    confirm: ConfirmQuery,
    notifier: &RecordingNotifier,
) -> Result<(), ApiError> {
    match editor.delete_one(id, &confirm.confirm, notifier).await? {
        Deletion::Deleted => Ok(()),
        Deletion::Cancelled => Err(ApiError::Validation(format!(
            "{} Repeat the request with confirm=true.",
            E::DELETE_PROMPT
        ))),
    }
}
