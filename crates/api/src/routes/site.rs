//! Public read endpoints used by the marketing pages.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::{group_by_section, Faq, Package, PackageType, PageContentItem, PageSection, SiteSetting};
use domain::services::{Entity, EntityEditor, Filter, RecordingNotifier};
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;

/// Settings as `category -> key -> value`.
pub type GroupedSettings = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Deserialize)]
pub struct PackageQuery {
    #[serde(rename = "type")]
    pub package_type: Option<PackageType>,
}

fn group_settings(settings: Vec<SiteSetting>) -> GroupedSettings {
    let mut grouped = GroupedSettings::new();
    for setting in settings {
        grouped
            .entry(setting.category)
            .or_default()
            .insert(setting.setting_key, setting.setting_value);
    }
    grouped
}

/// All site settings grouped by category.
///
/// GET /api/v1/site/settings
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<GroupedSettings>, ApiError> {
    let mut editor = EntityEditor::<SiteSetting>::new(state.backend.gateway());
    editor.load(&RecordingNotifier::new()).await?;
    Ok(Json(group_settings(editor.into_rows())))
}

/// Content of one page grouped by section.
///
/// GET /api/v1/pages/:page
pub async fn get_page(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> Result<Json<Vec<PageSection>>, ApiError> {
    let scope = PageContentItem::default_scope().filter(Filter::eq("page_name", page.as_str()));
    let mut editor = EntityEditor::<PageContentItem>::with_scope(state.backend.gateway(), scope);
    editor.load(&RecordingNotifier::new()).await?;

    let sections = group_by_section(editor.rows());
    if sections.is_empty() {
        return Err(ApiError::NotFound(format!("Page '{}' has no content", page)));
    }
    Ok(Json(sections))
}

/// Active packages in display order.
///
/// GET /api/v1/packages?type=exhibitor|sponsor
pub async fn list_packages(
    State(state): State<AppState>,
    Query(query): Query<PackageQuery>,
) -> Result<Json<Vec<Package>>, ApiError> {
    let mut editor = EntityEditor::<Package>::with_scope(
        state.backend.gateway(),
        Package::public_scope(query.package_type),
    );
    editor.load(&RecordingNotifier::new()).await?;
    Ok(Json(editor.into_rows()))
}

/// Active FAQs in display order.
///
/// GET /api/v1/faqs
pub async fn list_faqs(State(state): State<AppState>) -> Result<Json<Vec<Faq>>, ApiError> {
    let mut editor = EntityEditor::<Faq>::with_scope(state.backend.gateway(), Faq::public_scope());
    editor.load(&RecordingNotifier::new()).await?;
    Ok(Json(editor.into_rows()))
}
