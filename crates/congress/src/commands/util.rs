//! Shared helpers for command handlers.

use congress_api::Tagged;

use crate::error::CliError;

/// Apply `KEY=VALUE` pairs, rejecting the first one the tag rules refuse.
pub fn apply_tags(entity: &mut impl Tagged, tags: &[(String, String)]) -> Result<(), CliError> {
    for (key, value) in tags {
        if !entity.set_tag(key, value) {
            return Err(invalid_tag(key, value));
        }
    }
    Ok(())
}

pub fn invalid_tag(key: &str, value: &str) -> CliError {
    CliError::Validation {
        field: "tag".into(),
        reason: format!(
            "'{key}={value}' has characters outside letters, digits and _-+@ ,.=:"
        ),
    }
}
