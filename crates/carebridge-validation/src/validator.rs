use thiserror::Error;

use carebridge_types::{RawSubmission, ResourceSubmission, ResourceType};

pub const NAME_MAX: usize = 200;
pub const LOCATION_MAX: usize = 200;
pub const QUANTITY_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 1000;

/// First constraint a raw submission violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,

    #[error("Name too long")]
    NameTooLong,

    #[error("Invalid resource type")]
    InvalidType(String),

    #[error("Location is required")]
    LocationRequired,

    #[error("Location too long")]
    LocationTooLong,

    #[error("Quantity too long")]
    QuantityTooLong,

    #[error("Description too long")]
    DescriptionTooLong,
}

impl ValidationError {
    /// Form field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::NameRequired | ValidationError::NameTooLong => "name",
            ValidationError::InvalidType(_) => "type",
            ValidationError::LocationRequired | ValidationError::LocationTooLong => "location",
            ValidationError::QuantityTooLong => "quantity",
            ValidationError::DescriptionTooLong => "description",
        }
    }
}

/// Check a raw submission and return its normalized form.
///
/// Fields are trimmed, then checked in declaration order: name, type,
/// location, quantity, description. The first violation is returned.
/// Optional fields that are blank after trimming become `None`.
/// Lengths are counted in characters.
pub fn validate(raw: &RawSubmission) -> Result<ResourceSubmission, ValidationError> {
    let name = required(
        &raw.name,
        NAME_MAX,
        ValidationError::NameRequired,
        ValidationError::NameTooLong,
    )?;

    let type_str = raw.resource_type.trim();
    let resource_type: ResourceType = type_str
        .parse()
        .map_err(|_| ValidationError::InvalidType(type_str.to_string()))?;

    let location = required(
        &raw.location,
        LOCATION_MAX,
        ValidationError::LocationRequired,
        ValidationError::LocationTooLong,
    )?;

    let quantity = optional(
        raw.quantity.as_deref(),
        QUANTITY_MAX,
        ValidationError::QuantityTooLong,
    )?;
    let description = optional(
        raw.description.as_deref(),
        DESCRIPTION_MAX,
        ValidationError::DescriptionTooLong,
    )?;

    Ok(ResourceSubmission {
        name,
        resource_type,
        location,
        quantity,
        description,
    })
}

fn required(
    value: &str,
    max: usize,
    missing: ValidationError,
    too_long: ValidationError,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(missing);
    }
    if trimmed.chars().count() > max {
        return Err(too_long);
    }
    Ok(trimmed.to_string())
}

fn optional(
    value: Option<&str>,
    max: usize,
    too_long: ValidationError,
) -> Result<Option<String>, ValidationError> {
    let Some(trimmed) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > max {
        return Err(too_long);
    }
    Ok(Some(trimmed.to_string()))
}
