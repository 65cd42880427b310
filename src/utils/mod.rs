//! Small shared helpers.

pub mod json;

pub use json::{merge_extra, JsonObjectExt};

use crate::{Error, ErrorContext, Result};

/// Reject empty path identifiers before they turn into a malformed URL.
pub(crate) fn require_id<'a>(field: &str, id: &'a str) -> Result<&'a str> {
    let trimmed = id.trim();
    if trimmed.is_empty() || trimmed.contains('/') {
        return Err(Error::validation_with_context(
            format!("invalid {}: '{}'", field, id),
            ErrorContext::new().with_field_path(field),
        ));
    }
    Ok(trimmed)
}
