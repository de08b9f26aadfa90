use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Name,
    Age,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormField::Name => f.write_str("name"),
            FormField::Age => f.write_str("age"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FieldError {
    #[error("{field} is required")]
    Required { field: FormField },
    #[error("{field} must be a whole number")]
    NotANumber { field: FormField },
    #[error("{field} must be at least {min}")]
    BelowMinimum { field: FormField, min: u32 },
}

impl FieldError {
    pub fn field(&self) -> FormField {
        match self {
            FieldError::Required { field }
            | FieldError::NotANumber { field }
            | FieldError::BelowMinimum { field, .. } => *field,
        }
    }
}

/// Every field-level failure found in one validation pass, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("invalid user form: {}", render(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn for_field(&self, field: FormField) -> Option<&FieldError> {
        self.errors.iter().find(|error| error.field() == field)
    }
}

fn render(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
