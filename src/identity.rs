//! Player identity capture rules
//!
//! A name is letters and spaces only, an employee ID is digits only. Both are
//! trimmed before checking.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shortest accepted name (after trimming)
pub const MIN_NAME_LEN: usize = 2;
/// Shortest accepted employee ID
pub const MIN_ID_LEN: usize = 3;

/// Why an identity submission was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Please enter your name.")]
    EmptyName,
    #[error("Name must contain letters and spaces only.")]
    InvalidNameCharacters,
    #[error("Name must be at least {MIN_NAME_LEN} characters.")]
    NameTooShort,
    #[error("Please enter your employee ID.")]
    EmptyId,
    #[error("Employee ID must be numeric.")]
    NonNumericId,
    #[error("Employee ID must be at least {MIN_ID_LEN} digits.")]
    IdTooShort,
}

impl IdentityError {
    /// Which form field the message belongs next to
    pub fn field(&self) -> IdentityField {
        match self {
            IdentityError::EmptyName
            | IdentityError::InvalidNameCharacters
            | IdentityError::NameTooShort => IdentityField::Name,
            IdentityError::EmptyId | IdentityError::NonNumericId | IdentityError::IdTooShort => {
                IdentityField::Id
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Name,
    Id,
}

/// A validated player
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub id: String,
}

impl Identity {
    /// Validate raw form input
    pub fn parse(name: &str, id: &str) -> Result<Self, IdentityError> {
        let name = name.trim();
        let id = id.trim();

        if name.is_empty() {
            return Err(IdentityError::EmptyName);
        }
        if !name.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
            return Err(IdentityError::InvalidNameCharacters);
        }
        if name.chars().count() < MIN_NAME_LEN {
            return Err(IdentityError::NameTooShort);
        }

        if id.is_empty() {
            return Err(IdentityError::EmptyId);
        }
        if !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(IdentityError::NonNumericId);
        }
        if id.len() < MIN_ID_LEN {
            return Err(IdentityError::IdTooShort);
        }

        Ok(Self {
            name: name.to_string(),
            id: id.to_string(),
        })
    }
}
