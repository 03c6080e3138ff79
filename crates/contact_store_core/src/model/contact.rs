//! Contact domain model.
//!
//! # Responsibility
//! - Define the `Contact` record (name + email).
//! - Validate records before they are staged for persistence.
//!
//! # Invariants
//! - `name` is the stable key and is never blank.
//! - `email` is a free-form mutable string; any value is accepted.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identifying key of a contact.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ContactName = String;

/// Persisted contact entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Unique key within a store.
    pub name: ContactName,
    pub email: String,
}

/// Validation failure for a contact record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    EmptyName,
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "contact name cannot be empty"),
        }
    }
}

impl Error for ContactValidationError {}

impl Contact {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Checks the record against write-path rules.
    ///
    /// # Errors
    /// - `EmptyName` when `name` is blank; a blank key cannot identify a row.
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        if self.name.trim().is_empty() {
            return Err(ContactValidationError::EmptyName);
        }

        Ok(())
    }
}
