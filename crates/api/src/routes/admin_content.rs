//! Page content editor.

use axum::{extract::State, Json};
use domain::models::{group_by_section, PageContentItem, PageSection};
use domain::services::{EntityEditor, RecordingNotifier};

use super::{apply_and_save, ChangeSet, EditorResponse};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Admin;

/// GET /api/v1/admin/content
pub async fn get_content(
    State(state): State<AppState>,
    Admin(admin): Admin,
) -> Result<Json<EditorResponse<Vec<PageSection>>>, ApiError> {
    let notifier = RecordingNotifier::new();
    let mut editor = EntityEditor::<PageContentItem>::new(state.backend.gateway_for(&admin));
    editor.load(&notifier).await?;
    Ok(Json(EditorResponse::new(group_by_section(editor.rows()), &notifier)))
}

/// PUT /api/v1/admin/content
///
/// Every loaded item is written back, changed or not.
pub async fn update_content(
    State(state): State<AppState>,
    Admin(admin): Admin,
    Json(changes): Json<ChangeSet>,
) -> Result<Json<EditorResponse<Vec<PageSection>>>, ApiError> {
    let notifier = RecordingNotifier::new();
    let mut editor = EntityEditor::<PageContentItem>::new(state.backend.gateway_for(&admin));
    apply_and_save(&mut editor, changes.changes, &notifier).await?;
    Ok(Json(EditorResponse::new(group_by_section(editor.rows()), &notifier)))
}
