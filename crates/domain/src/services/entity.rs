//! Table-backed entity descriptions consumed by the entity editor.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::gateway::{Filter, OrderBy, Query};

/// Operation-specific notice texts for one editor view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Messages {
    pub load_failed: &'static str,
    pub save_failed: &'static str,
    pub saved: &'static str,
    pub create_failed: &'static str,
    pub created: &'static str,
    pub delete_failed: &'static str,
    pub deleted: &'static str,
}

impl Messages {
    pub const GENERIC: Messages = Messages {
        load_failed: "Failed to load data",
        save_failed: "Failed to save changes",
        saved: "Changes saved successfully",
        create_failed: "Failed to create item",
        created: "Item created successfully",
        delete_failed: "Failed to delete item",
        deleted: "Item deleted successfully",
    };
}

impl Default for Messages {
    fn default() -> Self {
        Messages::GENERIC
    }
}

/// What one editor view loads and how it reports outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorScope {
    pub filters: Vec<Filter>,
    pub order: Vec<OrderBy>,
    pub messages: Messages,
}

impl EditorScope {
    pub fn new(messages: Messages) -> Self {
        Self {
            filters: Vec::new(),
            order: Vec::new(),
            messages,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, order: OrderBy) -> Self {
        self.order.push(order);
        self
    }

    /// Gateway query matching this scope.
    pub fn query(&self) -> Query {
        Query {
            filters: self.filters.clone(),
            order: self.order.clone(),
        }
    }
}

/// A row type backed by one remote table.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Logical table name. Backends may map it to a physical name.
    const TABLE: &'static str;

    /// Fields written back on save. Identifiers are never included.
    const EDITABLE_FIELDS: &'static [&'static str];

    /// Whether update patches carry a refreshed `updated_at`.
    const TOUCHES_UPDATED_AT: bool = true;

    fn id(&self) -> &str;

    fn default_scope() -> EditorScope;
}

/// An entity the admin can create and delete.
pub trait ManagedEntity: Entity {
    type Draft: Serialize + Send + Sync;

    /// Question asked before a delete is issued.
    const DELETE_PROMPT: &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_query() {
        let scope = EditorScope::new(Messages::GENERIC)
            .filter(Filter::eq("category", "colors"))
            .order(OrderBy::asc("display_order"));
        let query = scope.query();

        assert_eq!(query.filters, scope.filters);
        assert_eq!(query.order, vec![OrderBy::asc("display_order")]);
    }

    #[test]
    fn test_messages_struct_update() {
        let messages = Messages {
            saved: "Colors updated",
            ..Messages::GENERIC
        };
        assert_eq!(messages.saved, "Colors updated");
        assert_eq!(messages.load_failed, Messages::GENERIC.load_failed);
        assert_eq!(Messages::default(), Messages::GENERIC);
    }
}
