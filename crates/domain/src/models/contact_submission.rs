//! Contact submission domain model and the public inquiry forms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::notice::Notice;
use crate::services::entity::{EditorScope, Entity, Messages};
use crate::services::gateway::{Filter, OrderBy};

/// Which public form a submission came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionType {
    Contact,
    Exhibitor,
    Sponsor,
}

impl SubmissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionType::Contact => "contact",
            SubmissionType::Exhibitor => "exhibitor",
            SubmissionType::Sponsor => "sponsor",
        }
    }

    /// Confirmation shown after the form is sent.
    pub fn confirmation(&self) -> Notice {
        match self {
            SubmissionType::Contact => Notice::titled(
                "Message Sent!",
                "Thank you for contacting us. We'll get back to you within 24 hours.",
            ),
            SubmissionType::Exhibitor => Notice::titled(
                "Application Submitted!",
                "We'll contact you within 24 hours to discuss your exhibition needs.",
            ),
            SubmissionType::Sponsor => Notice::titled(
                "Sponsorship Inquiry Submitted!",
                "Our partnerships team will contact you within 24 hours.",
            ),
        }
    }
}

impl std::fmt::Display for SubmissionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubmissionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contact" => Ok(SubmissionType::Contact),
            "exhibitor" => Ok(SubmissionType::Exhibitor),
            "sponsor" => Ok(SubmissionType::Sponsor),
            other => Err(format!("Unknown submission type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    New,
    Read,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::New => "new",
            SubmissionStatus::Read => "read",
        }
    }
}

/// A message left through one of the public forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
    pub submission_type: SubmissionType,
    #[serde(default)]
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
}

impl ContactSubmission {
    pub fn is_new(&self) -> bool {
        self.status == SubmissionStatus::New
    }

    /// Newest first, optionally restricted to one form.
    pub fn scope(submission_type: Option<SubmissionType>) -> EditorScope {
        let mut scope = EditorScope::new(Messages {
            load_failed: "Failed to load submissions",
            save_failed: "Failed to update status",
            saved: "Marked as read",
            ..Messages::GENERIC
        });
        if let Some(submission_type) = submission_type {
            scope = scope.filter(Filter::eq("submission_type", submission_type.as_str()));
        }
        scope.order(OrderBy::desc("created_at"))
    }
}

impl Entity for ContactSubmission {
    const TABLE: &'static str = "contact_submissions";
    const EDITABLE_FIELDS: &'static [&'static str] = &["status"];
    const TOUCHES_UPDATED_AT: bool = false;

    fn id(&self) -> &str {
        &self.id
    }

    fn default_scope() -> EditorScope {
        Self::scope(None)
    }
}

/// Row inserted when a public form is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub submission_type: SubmissionType,
    pub status: SubmissionStatus,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// General contact form.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: Option<String>,

    #[validate(length(min = 1, max = 200, message = "Subject is required"))]
    pub subject: String,

    #[validate(length(min = 1, max = 5000, message = "Message is required"))]
    pub message: String,
}

impl From<ContactForm> for NewSubmission {
    fn from(form: ContactForm) -> Self {
        Self {
            name: form.name,
            email: form.email,
            phone: non_empty(form.phone),
            subject: non_empty(Some(form.subject)),
            message: form.message,
            submission_type: SubmissionType::Contact,
            status: SubmissionStatus::New,
        }
    }
}

/// Exhibitor application form.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExhibitorForm {
    #[validate(length(min = 1, max = 200, message = "Company name is required"))]
    pub company_name: String,

    #[validate(length(min = 1, max = 200, message = "Contact person is required"))]
    pub contact_person: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: String,

    /// Product category, e.g. "Organic Food".
    #[validate(length(min = 1, max = 200, message = "Category is required"))]
    pub category: String,

    #[serde(default)]
    #[validate(length(max = 5000, message = "Message is too long"))]
    pub message: String,
}

impl From<ExhibitorForm> for NewSubmission {
    fn from(form: ExhibitorForm) -> Self {
        Self {
            name: format!("{} ({})", form.contact_person, form.company_name),
            email: form.email,
            phone: non_empty(Some(form.phone)),
            subject: Some(format!("Exhibitor application: {}", form.category)),
            message: form.message,
            submission_type: SubmissionType::Exhibitor,
            status: SubmissionStatus::New,
        }
    }
}

/// Sponsorship inquiry form.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SponsorForm {
    #[validate(length(min = 1, max = 200, message = "Company name is required"))]
    pub company_name: String,

    #[validate(length(min = 1, max = 200, message = "Contact person is required"))]
    pub contact_person: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: String,

    #[serde(default)]
    pub sponsorship_level: Option<String>,

    #[serde(default)]
    #[validate(length(max = 5000, message = "Message is too long"))]
    pub message: String,
}

impl From<SponsorForm> for NewSubmission {
    fn from(form: SponsorForm) -> Self {
        let subject = match non_empty(form.sponsorship_level) {
            Some(level) => format!("Sponsorship inquiry: {}", level),
            None => "Sponsorship inquiry".to_string(),
        };
        Self {
            name: format!("{} ({})", form.contact_person, form.company_name),
            email: form.email,
            phone: non_empty(Some(form.phone)),
            subject: Some(subject),
            message: form.message,
            submission_type: SubmissionType::Sponsor,
            status: SubmissionStatus::New,
        }
    }
}
