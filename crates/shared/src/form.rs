//! Plain form value filled in by a front end, and its pure validation.

use serde::{Deserialize, Serialize};

use crate::{
    error::{FieldError, FormField, ValidationErrors},
    protocol::{NewUser, User},
};

pub const MIN_AGE: u32 = 1;

/// Raw form input. `age` stays text until validation so a front end can hand over
/// exactly what the user typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserForm {
    pub name: String,
    pub age: String,
}

/// Values that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub name: String,
    pub age: u32,
}

impl UserForm {
    pub fn new(name: impl Into<String>, age: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: age.into(),
        }
    }

    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            age: user.age.to_string(),
        }
    }

    pub fn validate(&self) -> Result<UserDraft, ValidationErrors> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError::Required {
                field: FormField::Name,
            });
        }

        let age = match validate_age(&self.age) {
            Ok(age) => Some(age),
            Err(error) => {
                errors.push(error);
                None
            }
        };

        match age {
            Some(age) if errors.is_empty() => Ok(UserDraft {
                name: name.to_string(),
                age,
            }),
            _ => Err(ValidationErrors { errors }),
        }
    }
}

fn validate_age(raw: &str) -> Result<u32, FieldError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FieldError::Required {
            field: FormField::Age,
        });
    }

    let parsed = raw.parse::<i64>().map_err(|_| FieldError::NotANumber {
        field: FormField::Age,
    })?;
    if parsed < i64::from(MIN_AGE) {
        return Err(FieldError::BelowMinimum {
            field: FormField::Age,
            min: MIN_AGE,
        });
    }

    u32::try_from(parsed).map_err(|_| FieldError::NotANumber {
        field: FormField::Age,
    })
}

impl UserDraft {
    /// Merge onto a detached copy of an existing record; the identifier is kept.
    pub fn apply_to(self, mut user: User) -> User {
        user.name = self.name;
        user.age = self.age;
        user
    }
}

impl From<UserDraft> for NewUser {
    fn from(draft: UserDraft) -> Self {
        Self {
            name: draft.name,
            age: draft.age,
        }
    }
}
