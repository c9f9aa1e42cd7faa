//! Page content domain model.

use serde::{Deserialize, Serialize};

use crate::services::entity::{EditorScope, Entity, Messages};
use crate::services::gateway::OrderBy;

/// One editable text block of a marketing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContentItem {
    pub id: String,
    pub page_name: String,
    pub section_name: String,
    pub content_key: String,
    pub content_value: String,
    /// Widget hint (`text`, `textarea`, `url`, ...).
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

impl PageContentItem {
    /// Whether the value should be edited in a multi-line field.
    pub fn is_long_text(&self) -> bool {
        self.content_value.chars().count() > 100
            || self.content_key.contains("description")
            || self.content_key.contains("paragraph")
    }

    /// `hero_title` -> `hero title`
    pub fn label(&self) -> String {
        self.content_key.replace('_', " ")
    }
}

impl Entity for PageContentItem {
    const TABLE: &'static str = "page_content";
    const EDITABLE_FIELDS: &'static [&'static str] = &["content_value"];

    fn id(&self) -> &str {
        &self.id
    }

    fn default_scope() -> EditorScope {
        EditorScope::new(Messages {
            load_failed: "Failed to load page content",
            save_failed: "Failed to update content",
            saved: "Page content updated successfully. Refresh the website to see changes.",
            ..Messages::GENERIC
        })
        .order(OrderBy::asc("page_name"))
        .order(OrderBy::asc("section_name"))
        .order(OrderBy::asc("display_order"))
    }
}

/// Content of one section of a page, in load order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSection {
    pub page_name: String,
    pub section_name: String,
    pub items: Vec<PageContentItem>,
}

/// Groups items by `(page, section)` keeping the order in which each group
/// first appears and the order of items inside it.
pub fn group_by_section(items: &[PageContentItem]) -> Vec<PageSection> {
    let mut sections: Vec<PageSection> = Vec::new();
    for item in items {
        match sections
            .iter_mut()
            .find(|s| s.page_name == item.page_name && s.section_name == item.section_name)
        {
            Some(section) => section.items.push(item.clone()),
            None => sections.push(PageSection {
                page_name: item.page_name.clone(),
                section_name: item.section_name.clone(),
                items: vec![item.clone()],
            }),
        }
    }
    sections
}
