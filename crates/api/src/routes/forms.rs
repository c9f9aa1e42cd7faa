//! Public inquiry forms.
//!
//! A valid submission always answers with the form's confirmation notice.
//! It is stored in `contact_submissions` only when
//! `forms.persist_submissions` is enabled.

use axum::{extract::State, Json};
use domain::models::{
    ContactForm, ContactSubmission, ExhibitorForm, NewSubmission, Notice, SponsorForm,
    SubmissionType,
};
use domain::services::{Entity, GatewayError};
use serde::Serialize;
use serde_json::Value;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_form_submission;

const SUBMIT_FAILED: &str = "Failed to send your message. Please try again.";

#[derive(Debug, Serialize)]
pub struct FormAccepted {
    pub notice: Notice,
}

async fn store(state: &AppState, submission: NewSubmission) -> Result<(), GatewayError> {
    let row = match serde_json::to_value(&submission) {
        Ok(Value::Object(row)) => row,
        Ok(_) => return Err(GatewayError::Decode("submission is not an object".into())),
        Err(e) => return Err(GatewayError::Decode(e.to_string())),
    };
    state
        .backend
        .gateway()
        .insert(ContactSubmission::TABLE, row)
        .await
        .map(|_| ())
}

async fn accept<F>(state: &AppState, form: F) -> Result<Json<FormAccepted>, ApiError>
where
    F: Validate + Into<NewSubmission>,
{
    form.validate()?;
    let submission: NewSubmission = form.into();
    let kind: SubmissionType = submission.submission_type;
    let persist = state.config.forms.persist_submissions;

    if persist {
        if let Err(e) = store(state, submission).await {
            tracing::warn!(form = kind.as_str(), error = %e, "Failed to store submission");
            return Err(ApiError::OperationFailed(SUBMIT_FAILED.to_string()));
        }
    }

    tracing::info!(form = kind.as_str(), persisted = persist, "Form submitted");
    record_form_submission(kind.as_str(), persist);

    Ok(Json(FormAccepted {
        notice: kind.confirmation(),
    }))
}

/// POST /api/v1/forms/contact
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> Result<Json<FormAccepted>, ApiError> {
    accept(&state, form).await
}

/// POST /api/v1/forms/exhibitor
pub async fn submit_exhibitor(
    State(state): State<AppState>,
    Json(form): Json<ExhibitorForm>,
) -> Result<Json<FormAccepted>, ApiError> {
    accept(&state, form).await
}

/// POST /api/v1/forms/sponsor
pub async fn submit_sponsor(
    State(state): State<AppState>,
    Json(form): Json<SponsorForm>,
) -> Result<Json<FormAccepted>, ApiError> {
    accept(&state, form).await
}
