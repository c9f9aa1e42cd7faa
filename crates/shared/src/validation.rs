//! Common validation utilities.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Maximum size of an uploaded branding image (2 MiB).
pub const MAX_IMAGE_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

lazy_static! {
    /// `"H S% L%"` with optional percent signs, e.g. `130 45% 30%`.
    static ref HSL_PATTERN: Regex =
        Regex::new(r"^\s*\d+(\.\d+)?\s+\d+(\.\d+)?%?\s+\d+(\.\d+)?%?\s*$").unwrap();

    /// Digits with optional leading `+` and common separators.
    static ref PHONE_PATTERN: Regex = Regex::new(r"^\+?[0-9(][0-9 ()\-]{5,24}$").unwrap();
}

/// Validates that a colour setting is written as `hue saturation% lightness%`.
pub fn validate_hsl_value(value: &str) -> Result<(), ValidationError> {
    if HSL_PATTERN.is_match(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("hsl_format");
        err.message = Some("Colour must use HSL format: hue saturation% lightness%".into());
        Err(err)
    }
}

/// Validates a contact phone number.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_PATTERN.is_match(phone.trim()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone_format");
        err.message = Some("Invalid phone number".into());
        Err(err)
    }
}

/// Validates that an upload is an image.
pub fn validate_image_content_type(content_type: &str) -> Result<(), ValidationError> {
    if content_type.starts_with("image/") {
        Ok(())
    } else {
        let mut err = ValidationError::new("content_type");
        err.message = Some("Please upload an image file".into());
        Err(err)
    }
}

/// Validates upload size against [`MAX_IMAGE_UPLOAD_BYTES`].
pub fn validate_image_size(len: usize) -> Result<(), ValidationError> {
    if len > 0 && len <= MAX_IMAGE_UPLOAD_BYTES {
        Ok(())
    } else {
        let mut err = ValidationError::new("file_size");
        err.message = Some("File size must be less than 2MB".into());
        Err(err)
    }
}
