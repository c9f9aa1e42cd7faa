//! Site setting domain model.
//!
//! Settings are key/value rows grouped by category. They are seeded outside
//! this system and only their values are ever changed here.

use serde::{Deserialize, Serialize};

use crate::services::entity::{EditorScope, Entity, Messages};
use crate::services::gateway::{Filter, OrderBy};

/// Known setting categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingCategory {
    General,
    Hero,
    Stats,
    Contact,
    Colors,
    Branding,
    Seo,
}

impl SettingCategory {
    pub const ALL: [SettingCategory; 7] = [
        SettingCategory::General,
        SettingCategory::Hero,
        SettingCategory::Stats,
        SettingCategory::Contact,
        SettingCategory::Colors,
        SettingCategory::Branding,
        SettingCategory::Seo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingCategory::General => "general",
            SettingCategory::Hero => "hero",
            SettingCategory::Stats => "stats",
            SettingCategory::Contact => "contact",
            SettingCategory::Colors => "colors",
            SettingCategory::Branding => "branding",
            SettingCategory::Seo => "seo",
        }
    }
}

impl std::fmt::Display for SettingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SettingCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown setting category: {}", s))
    }
}

/// A row of the site settings table.
///
/// `category` stays free text so rows seeded with a category this build does
/// not know about still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSetting {
    pub id: String,
    pub category: String,
    pub setting_key: String,
    pub setting_value: String,
    #[serde(default)]
    pub setting_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl SiteSetting {
    pub fn category(&self) -> Option<SettingCategory> {
        self.category.parse().ok()
    }

    /// Label shown next to the field: the description, falling back to the key.
    pub fn label(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.setting_key)
    }

    /// Editor scope for the general settings view (every category).
    pub fn settings_scope() -> EditorScope {
        EditorScope::new(Messages {
            load_failed: "Failed to load settings",
            save_failed: "Failed to update setting",
            saved: "Settings updated successfully",
            ..Messages::GENERIC
        })
        .order(OrderBy::asc("category"))
    }

    /// Editor scope for the SEO view.
    pub fn seo_scope() -> EditorScope {
        EditorScope::new(Messages {
            load_failed: "Failed to load SEO settings",
            save_failed: "Failed to update SEO settings",
            saved: "SEO settings updated successfully",
            ..Messages::GENERIC
        })
        .filter(Filter::eq("category", SettingCategory::Seo.as_str()))
        .order(OrderBy::asc("setting_key"))
    }

    /// Editor scope for the logo and branding view.
    pub fn branding_scope() -> EditorScope {
        EditorScope::new(Messages {
            load_failed: "Failed to load branding settings",
            save_failed: "Failed to update settings",
            saved: "Branding settings updated successfully. Refresh the website to see changes.",
            ..Messages::GENERIC
        })
        .filter(Filter::eq("category", SettingCategory::Branding.as_str()))
    }

    /// Editor scope for the design view (colour settings).
    pub fn colors_scope() -> EditorScope {
        EditorScope::new(Messages {
            load_failed: "Failed to load color settings",
            save_failed: "Failed to update colors",
            saved: "Colors updated successfully. Refresh the page to see changes.",
            ..Messages::GENERIC
        })
        .filter(Filter::eq("category", SettingCategory::Colors.as_str()))
    }
}

impl Entity for SiteSetting {
    const TABLE: &'static str = "site_settings";
    const EDITABLE_FIELDS: &'static [&'static str] = &["setting_value"];

    fn id(&self) -> &str {
        &self.id
    }

    fn default_scope() -> EditorScope {
        Self::settings_scope()
    }
}

/// Splits SEO settings into meta tags and Open Graph tags by key prefix.
pub fn split_seo_settings(settings: &[SiteSetting]) -> (Vec<&SiteSetting>, Vec<&SiteSetting>) {
    let meta = settings
        .iter()
        .filter(|s| s.setting_key.starts_with("meta_"))
        .collect();
    let og = settings
        .iter()
        .filter(|s| s.setting_key.starts_with("og_"))
        .collect();
    (meta, og)
}
