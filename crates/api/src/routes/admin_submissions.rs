//! Contact form submissions inbox.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::{ContactSubmission, SubmissionStatus, SubmissionType};
use domain::services::{EntityEditor, RecordingNotifier};
use serde::Deserialize;
use serde_json::Value;

use super::EditorResponse;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Admin;

#[derive(Debug, Default, Deserialize)]
pub struct SubmissionQuery {
    #[serde(rename = "type")]
    pub submission_type: Option<SubmissionType>,
}

type SubmissionsResponse = Json<EditorResponse<Vec<ContactSubmission>>>;

/// Newest first.
///
/// GET /api/v1/admin/submissions?type=contact|exhibitor|sponsor
pub async fn list_submissions(
    State(state): State<AppState>,
    Admin(admin): Admin,
    Query(query): Query<SubmissionQuery>,
) -> Result<SubmissionsResponse, ApiError> {
    let notifier = RecordingNotifier::new();
    let mut editor = EntityEditor::<ContactSubmission>::with_scope(
        state.backend.gateway_for(&admin),
        ContactSubmission::scope(query.submission_type),
    );
    editor.load(&notifier).await?;
    Ok(Json(EditorResponse::new(editor.into_rows(), &notifier)))
}

/// POST /api/v1/admin/submissions/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    Admin(admin): Admin,
    Path(id): Path<String>,
) -> Result<SubmissionsResponse, ApiError> {
    let notifier = RecordingNotifier::new();
    let mut editor = EntityEditor::<ContactSubmission>::new(state.backend.gateway_for(&admin));
    editor.load(&notifier).await?;

    let already_read = editor.get(&id).map(|s| !s.is_new());
    match already_read {
        None => return Err(ApiError::NotFound(format!("Submission {} not found", id))),
        Some(true) => {}
        Some(false) => {
            editor.mutate_field(
                &id,
                "status",
                Value::String(SubmissionStatus::Read.as_str().to_string()),
            )?;
            editor.save_one(&id, &notifier).await?;
        }
    }

    Ok(Json(EditorResponse::new(editor.into_rows(), &notifier)))
}
