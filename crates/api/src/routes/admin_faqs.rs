//! FAQ management.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{Faq, NewFaq};
use domain::services::{EntityEditor, RecordingNotifier};
use validator::Validate;

use super::{delete_confirmed, patch_and_save, ConfirmQuery, EditorResponse, RowPatch};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Admin;

type FaqsResponse = Json<EditorResponse<Vec<Faq>>>;

fn editor(state: &AppState, admin: &Admin) -> EntityEditor<Faq> {
    EntityEditor::with_scope(state.backend.gateway_for(&admin.0), Faq::scope())
}

/// GET /api/v1/admin/faqs
pub async fn list_faqs(State(state): State<AppState>, admin: Admin) -> Result<FaqsResponse, ApiError> {
    let notifier = RecordingNotifier::new();
    let mut editor = editor(&state, &admin);
    editor.load(&notifier).await?;
    Ok(Json(EditorResponse::new(editor.into_rows(), &notifier)))
}

/// POST /api/v1/admin/faqs
///
/// A missing `display_order` places the FAQ after the existing ones.
pub async fn create_faq(
    State(state): State<AppState>,
    admin: Admin,
    Json(mut draft): Json<NewFaq>,
) -> Result<(StatusCode, FaqsResponse), ApiError> {
    draft.validate()?;

    let notifier = RecordingNotifier::new();
    let mut editor = editor(&state, &admin);
    if draft.display_order.is_none() {
        editor.load(&notifier).await?;
        draft.display_order = NewFaq::blank(editor.rows().len()).display_order;
    }
    editor.create_one(&draft, &notifier).await?;

    tracing::info!(user = %admin.0.current_user().user_id, "FAQ created");
    Ok((
        StatusCode::CREATED,
        Json(EditorResponse::new(editor.into_rows(), &notifier)),
    ))
}

/// PUT /api/v1/admin/faqs/:id
pub async fn update_faq(
    State(state): State<AppState>,
    admin: Admin,
    Path(id): Path<String>,
    Json(patch): Json<RowPatch>,
) -> Result<FaqsResponse, ApiError> {
    let notifier = RecordingNotifier::new();
    let mut editor = editor(&state, &admin);
    patch_and_save(&mut editor, &id, patch, &notifier).await?;
    Ok(Json(EditorResponse::new(editor.into_rows(), &notifier)))
}

/// DELETE /api/v1/admin/faqs/:id?confirm=true
pub async fn delete_faq(
    State(state): State<AppState>,
    admin: Admin,
    Path(id): Path<String>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<FaqsResponse, ApiError> {
    let notifier = RecordingNotifier::new();
    let mut editor = editor(&state, &admin);
    delete_confirmed(&mut editor, &id, confirm, &notifier).await?;

    tracing::info!(user = %admin.0.current_user().user_id, faq_id = %id, "FAQ deleted");
    Ok(Json(EditorResponse::new(editor.into_rows(), &notifier)))
}
