//! Exhibition and sponsorship package management.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{NewPackage, Package};
use domain::services::{EntityEditor, RecordingNotifier};
use validator::Validate;

use super::{delete_confirmed, patch_and_save, ConfirmQuery, EditorResponse, RowPatch};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Admin;

type PackagesResponse = Json<EditorResponse<Vec<Package>>>;

fn editor(state: &AppState, admin: &Admin) -> EntityEditor<Package> {
    EntityEditor::with_scope(state.backend.gateway_for(&admin.0), Package::scope())
}

/// GET /api/v1/admin/packages
pub async fn list_packages(
    State(state): State<AppState>,
    admin: Admin,
) -> Result<PackagesResponse, ApiError> {
    let notifier = RecordingNotifier::new();
    let mut editor = editor(&state, &admin);
    editor.load(&notifier).await?;
    Ok(Json(EditorResponse::new(editor.into_rows(), &notifier)))
}

/// POST /api/v1/admin/packages
pub async fn create_package(
    State(state): State<AppState>,
    admin: Admin,
    Json(draft): Json<NewPackage>,
) -> Result<(StatusCode, PackagesResponse), ApiError> {
    draft.validate()?;

    let notifier = RecordingNotifier::new();
    let mut editor = editor(&state, &admin);
    editor.create_one(&draft, &notifier).await?;

    tracing::info!(
        user = %admin.0.current_user().user_id,
        package = %draft.name,
        "Package created"
    );
    Ok((
        StatusCode::CREATED,
        Json(EditorResponse::new(editor.into_rows(), &notifier)),
    ))
}

/// PUT /api/v1/admin/packages/:id
pub async fn update_package(
    State(state): State<AppState>,
    admin: Admin,
    Path(id): Path<String>,
    Json(patch): Json<RowPatch>,
) -> Result<PackagesResponse, ApiError> {
    let notifier = RecordingNotifier::new();
    let mut editor = editor(&state, &admin);
    patch_and_save(&mut editor, &id, patch, &notifier).await?;
    Ok(Json(EditorResponse::new(editor.into_rows(), &notifier)))
}

/// DELETE /api/v1/admin/packages/:id?confirm=true
pub async fn delete_package(
    State(state): State<AppState>,
    admin: Admin,
    Path(id): Path<String>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<PackagesResponse, ApiError> {
    let notifier = RecordingNotifier::new();
    let mut editor = editor(&state, &admin);
    delete_confirmed(&mut editor, &id, confirm, &notifier).await?;

    tracing::info!(user = %admin.0.current_user().user_id, package_id = %id, "Package deleted");
    Ok(Json(EditorResponse::new(editor.into_rows(), &notifier)))
}
