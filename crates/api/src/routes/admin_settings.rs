//! Site settings views: general settings, SEO, branding and design colours.
//!
//! All four edit rows of `site_settings` and differ only in scope and in how
//! the loaded rows are presented.

use axum::{extract::State, Json};
use domain::models::site_setting::split_seo_settings;
use domain::models::SiteSetting;
use domain::services::{hsl_to_hex, EditorScope, EntityEditor, RecordingNotifier};
use serde::Serialize;
use shared::validation::validate_hsl_value;

use super::{apply_and_save, ChangeSet, EditorResponse};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Admin;

/// Settings of one category, in load order.
#[derive(Debug, Serialize)]
pub struct SettingsGroup {
    pub category: String,
    pub settings: Vec<SiteSetting>,
}

#[derive(Debug, Serialize)]
pub struct SeoView {
    pub meta: Vec<SiteSetting>,
    pub open_graph: Vec<SiteSetting>,
    pub other: Vec<SiteSetting>,
}

/// A colour setting with its hex rendering.
#[derive(Debug, Serialize)]
pub struct ColorSetting {
    #[serde(flatten)]
    pub setting: SiteSetting,
    /// `None` when the stored value is not a parsable HSL triple.
    pub preview: Option<String>,
}

fn group_by_category(settings: Vec<SiteSetting>) -> Vec<SettingsGroup> {
    let mut groups: Vec<SettingsGroup> = Vec::new();
    for setting in settings {
        match groups.iter_mut().find(|g| g.category == setting.category) {
            Some(group) => group.settings.push(setting),
            None => groups.push(SettingsGroup {
                category: setting.category.clone(),
                settings: vec![setting],
            }),
        }
    }
    groups
}

fn seo_view(settings: Vec<SiteSetting>) -> SeoView {
    let (meta, open_graph) = split_seo_settings(&settings);
    let meta: Vec<SiteSetting> = meta.into_iter().cloned().collect();
    let open_graph: Vec<SiteSetting> = open_graph.into_iter().cloned().collect();
    let other = settings
        .into_iter()
        .filter(|s| !meta.contains(s) && !open_graph.contains(s))
        .collect();
    SeoView {
        meta,
        open_graph,
        other,
    }
}

fn color_view(settings: Vec<SiteSetting>) -> Vec<ColorSetting> {
    settings
        .into_iter()
        .map(|setting| ColorSetting {
            preview: hsl_to_hex(&setting.setting_value).ok(),
            setting,
        })
        .collect()
}

async fn load(
    state: &AppState,
    admin: &Admin,
    scope: EditorScope,
) -> Result<(Vec<SiteSetting>, RecordingNotifier), ApiError> {
    let notifier = RecordingNotifier::new();
    let mut editor = EntityEditor::<SiteSetting>::with_scope(state.backend.gateway_for(&admin.0), scope);
    editor.load(&notifier).await?;
    Ok((editor.into_rows(), notifier))
}

async fn save(
    state: &AppState,
    admin: &Admin,
    scope: EditorScope,
    changes: ChangeSet,
) -> Result<(Vec<SiteSetting>, RecordingNotifier), ApiError> {
    let notifier = RecordingNotifier::new();
    let mut editor = EntityEditor::<SiteSetting>::with_scope(state.backend.gateway_for(&admin.0), scope);
    apply_and_save(&mut editor, changes.changes, &notifier).await?;
    Ok((editor.into_rows(), notifier))
}

/// GET /api/v1/admin/settings
pub async fn get_settings(
    State(state): State<AppState>,
    admin: Admin,
) -> Result<Json<EditorResponse<Vec<SettingsGroup>>>, ApiError> {
    let (rows, notifier) = load(&state, &admin, SiteSetting::settings_scope()).await?;
    Ok(Json(EditorResponse::new(group_by_category(rows), &notifier)))
}

/// PUT /api/v1/admin/settings
pub async fn update_settings(
    State(state): State<AppState>,
    admin: Admin,
    Json(changes): Json<ChangeSet>,
) -> Result<Json<EditorResponse<Vec<SettingsGroup>>>, ApiError> {
    let (rows, notifier) = save(&state, &admin, SiteSetting::settings_scope(), changes).await?;
    Ok(Json(EditorResponse::new(group_by_category(rows), &notifier)))
}

/// GET /api/v1/admin/seo
pub async fn get_seo(
    State(state): State<AppState>,
    admin: Admin,
) -> Result<Json<EditorResponse<SeoView>>, ApiError> {
    let (rows, notifier) = load(&state, &admin, SiteSetting::seo_scope()).await?;
    Ok(Json(EditorResponse::new(seo_view(rows), &notifier)))
}

/// PUT /api/v1/admin/seo
pub async fn update_seo(
    State(state): State<AppState>,
    admin: Admin,
    Json(changes): Json<ChangeSet>,
) -> Result<Json<EditorResponse<SeoView>>, ApiError> {
    let (rows, notifier) = save(&state, &admin, SiteSetting::seo_scope(), changes).await?;
    Ok(Json(EditorResponse::new(seo_view(rows), &notifier)))
}

/// GET /api/v1/admin/branding
pub async fn get_branding(
    State(state): State<AppState>,
    admin: Admin,
) -> Result<Json<EditorResponse<Vec<SiteSetting>>>, ApiError> {
    let (rows, notifier) = load(&state, &admin, SiteSetting::branding_scope()).await?;
    Ok(Json(EditorResponse::new(rows, &notifier)))
}

/// PUT /api/v1/admin/branding
pub async fn update_branding(
    State(state): State<AppState>,
    admin: Admin,
    Json(changes): Json<ChangeSet>,
) -> Result<Json<EditorResponse<Vec<SiteSetting>>>, ApiError> {
    let (rows, notifier) = save(&state, &admin, SiteSetting::branding_scope(), changes).await?;
    Ok(Json(EditorResponse::new(rows, &notifier)))
}

/// GET /api/v1/admin/design
pub async fn get_design(
    State(state): State<AppState>,
    admin: Admin,
) -> Result<Json<EditorResponse<Vec<ColorSetting>>>, ApiError> {
    let (rows, notifier) = load(&state, &admin, SiteSetting::colors_scope()).await?;
    Ok(Json(EditorResponse::new(color_view(rows), &notifier)))
}

/// PUT /api/v1/admin/design
///
/// Every new value must be an HSL triple; nothing is written otherwise.
pub async fn update_design(
    State(state): State<AppState>,
    admin: Admin,
    Json(changes): Json<ChangeSet>,
) -> Result<Json<EditorResponse<Vec<ColorSetting>>>, ApiError> {
    for change in &changes.changes {
        let value = change.value.as_str().unwrap_or_default();
        validate_hsl_value(value)?;
    }

    let (rows, notifier) = save(&state, &admin, SiteSetting::colors_scope(), changes).await?;
    Ok(Json(EditorResponse::new(color_view(rows), &notifier)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setting(category: &str, key: &str, value: &str) -> SiteSetting {
        SiteSetting {
            id: key.to_string(),
            category: category.to_string(),
            setting_key: key.to_string(),
            setting_value: value.to_string(),
            setting_type: None,
            description: None,
        }
    }

    #[test]
    fn test_group_by_category_keeps_load_order() {
        let groups = group_by_category(vec![
            setting("contact", "email", "info@greenlifeexpo.com"),
            setting("general", "site_name", "Green Life Expo"),
            setting("contact", "phone", "+1 555 0100"),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "contact");
        assert_eq!(groups[0].settings.len(), 2);
        assert_eq!(groups[1].category, "general");
    }

    #[test]
    fn test_seo_view_keeps_unprefixed_keys() {
        let view = seo_view(vec![
            setting("seo", "meta_title", "Green Life Expo"),
            setting("seo", "og_image", "https://cdn.example.com/og.png"),
            setting("seo", "canonical_url", "https://greenlifeexpo.com"),
        ]);

        assert_eq!(view.meta.len(), 1);
        assert_eq!(view.open_graph.len(), 1);
        assert_eq!(view.other[0].setting_key, "canonical_url");
    }

    #[test]
    fn test_color_view_preview() {
        let view = color_view(vec![
            setting("colors", "primary_color", "130 45% 30%"),
            setting("colors", "broken_color", "green"),
        ]);

        assert_eq!(view[0].preview.as_deref(), Some("#2a6f36"));
        assert_eq!(view[1].preview, None);

        let json = serde_json::to_value(&view[0]).unwrap();
        assert_eq!(json["setting_key"], "primary_color");
        assert_eq!(json["preview"], "#2a6f36");
    }
}
