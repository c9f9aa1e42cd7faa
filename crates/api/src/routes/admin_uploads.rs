//! Branding image uploads.
//!
//! The image is stored in the configured bucket and its public URL becomes the
//! value of the branding setting named in the path.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use chrono::Utc;
use domain::models::{Notice, SiteSetting};
use domain::services::{EntityEditor, Notifier, RecordingNotifier};
use serde::Serialize;
use serde_json::Value;
use shared::validation::{validate_image_content_type, validate_image_size};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Admin;
use crate::middleware::metrics::record_image_upload;

const UPLOAD_FAILED: &str = "Failed to upload image";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub setting: Option<SiteSetting>,
    pub notices: Vec<Notice>,
}

struct ImageFile {
    file_name: Option<String>,
    content_type: String,
    bytes: Vec<u8>,
}

async fn read_image(multipart: &mut Multipart) -> Result<ImageFile, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;
        return Ok(ImageFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Err(ApiError::Validation("Missing multipart field 'file'".into()))
}

/// Extension of the client's file name, else the usual one for the content type.
fn file_extension(file_name: Option<&str>, content_type: &str) -> String {
    file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .or_else(|| {
            mime_guess::get_mime_extensions_str(content_type)
                .and_then(|exts| exts.first())
                .map(|ext| ext.to_string())
        })
        .unwrap_or_else(|| "bin".to_string())
}

/// `{setting_key}_{unix millis}.{ext}`
fn object_path(setting_key: &str, ext: &str, millis: i64) -> String {
    format!("{}_{}.{}", setting_key, millis, ext)
}

/// POST /api/v1/admin/uploads/:setting_key
pub async fn upload_image(
    State(state): State<AppState>,
    Admin(admin): Admin,
    Path(setting_key): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let image = read_image(&mut multipart).await?;
    validate_image_content_type(&image.content_type)?;
    validate_image_size(image.bytes.len())?;

    let notifier = RecordingNotifier::new();
    let mut editor = EntityEditor::<SiteSetting>::with_scope(
        state.backend.gateway_for(&admin),
        SiteSetting::branding_scope(),
    );
    editor.load(&notifier).await?;
    let setting_id = editor
        .rows()
        .iter()
        .find(|s| s.setting_key == setting_key)
        .map(|s| s.id.clone())
        .ok_or_else(|| ApiError::NotFound(format!("Branding setting '{}' not found", setting_key)))?;

    let ext = file_extension(image.file_name.as_deref(), &image.content_type);
    let path = object_path(&setting_key, &ext, Utc::now().timestamp_millis());
    let bucket = &state.config.uploads.bucket;
    let size = image.bytes.len();

    let storage = state.backend.storage_for(&admin);
    if let Err(e) = storage
        .upload(bucket, &path, image.bytes, &image.content_type, true)
        .await
    {
        tracing::warn!(bucket = %bucket, path = %path, error = %e, "Image upload failed");
        return Err(ApiError::OperationFailed(UPLOAD_FAILED.to_string()));
    }
    let url = storage.public_url(bucket, &path);
    record_image_upload(&setting_key, size);
    tracing::info!(
        user = %admin.current_user().user_id,
        setting = %setting_key,
        path = %path,
        bytes = size,
        "Image uploaded"
    );
    notifier.notify(Notice::success("Image uploaded successfully"));

    editor.mutate_field(&setting_id, "setting_value", Value::String(url.clone()))?;
    editor.save_one(&setting_id, &notifier).await?;

    Ok(Json(UploadResponse {
        setting: editor.get(&setting_id).cloned(),
        url,
        notices: notifier.take(),
    }))
}
