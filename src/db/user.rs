//! User model for gator.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: Uuid,
    /// User name (unique).
    pub name: String,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
}

impl NewUser {
    /// Create a new user with the given name.
    ///
    /// Surrounding whitespace is removed.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
        }
    }

    /// Check that the name is usable.
    pub fn validate(&self) -> crate::Result<()> {
        if self.name.is_empty() {
            return Err(crate::GatorError::Validation(
                "user name must not be empty".to_string(),
            ));
        }
        if self.name.chars().any(char::is_whitespace) {
            return Err(crate::GatorError::Validation(format!(
                "user name must not contain whitespace: {:?}",
                self.name
            )));
        }
        Ok(())
    }
}
