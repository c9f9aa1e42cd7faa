//! Logical to physical table name mapping.

use domain::services::GatewayError;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[a-z_][a-z0-9_]*$").unwrap();
}

/// Checks that `name` is a plain lower-case SQL identifier.
pub fn validate_identifier(name: &str) -> Result<&str, GatewayError> {
    if name.len() <= 63 && IDENTIFIER.is_match(name) {
        Ok(name)
    } else {
        Err(GatewayError::InvalidIdentifier(name.to_string()))
    }
}

/// Double-quoted identifier, validated first.
pub fn quoted(name: &str) -> Result<String, GatewayError> {
    validate_identifier(name).map(|n| format!("\"{}\"", n))
}

/// Maps logical table names onto the deployed schema.
///
/// The deployed tables carry a date suffix, e.g. `packages_20251225`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableNames {
    suffix: String,
}

impl TableNames {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn physical(&self, logical: &str) -> Result<String, GatewayError> {
        let name = format!("{}{}", logical, self.suffix);
        validate_identifier(&name)?;
        Ok(name)
    }
}
