//! FAQ domain model.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::entity::{EditorScope, Entity, ManagedEntity, Messages};
use crate::services::gateway::{Filter, OrderBy};

/// A frequently asked question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    pub id: String,
    pub question: String,
    pub answer: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_category() -> String {
    "general".to_string()
}

fn default_active() -> bool {
    true
}

impl Faq {
    pub fn scope() -> EditorScope {
        EditorScope::new(Messages {
            load_failed: "Failed to load FAQs",
            save_failed: "Failed to update FAQ",
            saved: "FAQ updated successfully",
            create_failed: "Failed to create FAQ",
            created: "FAQ created successfully",
            delete_failed: "Failed to delete FAQ",
            deleted: "FAQ deleted successfully",
        })
        .order(OrderBy::asc("display_order"))
    }

    pub fn public_scope() -> EditorScope {
        Self::scope().filter(Filter::eq("is_active", "true"))
    }
}

impl Entity for Faq {
    const TABLE: &'static str = "faqs";
    const EDITABLE_FIELDS: &'static [&'static str] =
        &["question", "answer", "category", "display_order", "is_active"];

    fn id(&self) -> &str {
        &self.id
    }

    fn default_scope() -> EditorScope {
        Self::scope()
    }
}

impl ManagedEntity for Faq {
    type Draft = NewFaq;

    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this FAQ?";
}

/// Request payload for creating a FAQ.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewFaq {
    #[validate(length(min = 1, max = 500, message = "Question must be 1-500 characters"))]
    pub question: String,

    #[validate(length(min = 1, max = 5000, message = "Answer must be 1-5000 characters"))]
    pub answer: String,

    #[serde(default = "default_category")]
    #[validate(length(min = 1, max = 50, message = "Category must be 1-50 characters"))]
    pub category: String,

    /// `None` lets the caller choose a position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl NewFaq {
    /// Blank draft placed after `existing` FAQs.
    pub fn blank(existing: usize) -> Self {
        Self {
            question: String::new(),
            answer: String::new(),
            category: default_category(),
            display_order: Some(existing as i32 + 1),
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_faq_defaults() {
        let draft: NewFaq = serde_json::from_value(json!({
            "question": "Where is the venue?",
            "answer": "Cairo International Convention Center"
        }))
        .unwrap();
        assert_eq!(draft.category, "general");
        assert_eq!(draft.display_order, None);
        assert!(draft.is_active);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_new_faq_keeps_explicit_zero_order() {
        let draft: NewFaq = serde_json::from_value(json!({
            "question": "Is there a dress code?",
            "answer": "No",
            "display_order": 0
        }))
        .unwrap();
        assert_eq!(draft.display_order, Some(0));
        assert_eq!(serde_json::to_value(&draft).unwrap()["display_order"], 0);
    }

    #[test]
    fn test_blank_draft_order() {
        let draft = NewFaq::blank(4);
        assert_eq!(draft.display_order, Some(5));
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_public_scope() {
        let scope = Faq::public_scope();
        assert_eq!(scope.filters, vec![Filter::eq("is_active", "true")]);
        assert_eq!(scope.order, vec![OrderBy::asc("display_order")]);
    }
}
