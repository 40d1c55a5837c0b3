//! Role input rules and well-known role names.
//!
//! Both store implementations run every create/update through
//! [`RoleInput::validated`] so the trimming and length rules are identical
//! regardless of backend. Name uniqueness needs the store and is checked there.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::CoreError;
use crate::validation::FieldErrors;

/// Role name that grants access to the admin surface.
pub const ROLE_ADMIN: &str = "admin";

/// Maximum length (in characters) of a role name or description.
pub const MAX_FIELD_LENGTH: usize = 255;

pub const NAME_REQUIRED_MESSAGE: &str = "The Name field is required.";
pub const NAME_TOO_LONG_MESSAGE: &str = "The Name field cannot exceed 255 characters in length.";
pub const DESCRIPTION_TOO_LONG_MESSAGE: &str =
    "The Description field cannot exceed 255 characters in length.";
pub const NAME_NOT_UNIQUE_MESSAGE: &str = "The Name field must contain a unique value.";

/// Name and description submitted for a role create or update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RoleInput {
    #[validate(
        custom(function = "validate_required"),
        length(max = 255, message = "The Name field cannot exceed 255 characters in length.")
    )]
    pub name: String,

    #[validate(length(
        max = 255,
        message = "The Description field cannot exceed 255 characters in length."
    ))]
    #[serde(default)]
    pub description: Option<String>,
}

fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(
            ValidationError::new("required").with_message(Cow::Borrowed(NAME_REQUIRED_MESSAGE))
        );
    }
    Ok(())
}

impl RoleInput {
    pub fn new(name: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            name: name.into(),
            description: description.map(str::to_string),
        }
    }

    /// Trim both fields and collapse an empty description to `None`.
    pub fn normalized(&self) -> Self {
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        Self {
            name: self.name.trim().to_string(),
            description,
        }
    }

    /// Normalize and run the declarative field rules.
    pub fn validated(&self) -> Result<Self, CoreError> {
        let input = self.normalized();
        input
            .validate()
            .map_err(|e| CoreError::InvalidFields(FieldErrors::from(e)))?;
        Ok(input)
    }
}

/// Field error reported when another role already uses the submitted name.
pub fn duplicate_name_error() -> CoreError {
    CoreError::InvalidFields(FieldErrors::single("name", NAME_NOT_UNIQUE_MESSAGE))
}
