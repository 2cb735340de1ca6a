//! Username type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// Length outside the allowed range (after trimming).
    #[error("username must be between {min} and {max} characters")]
    Length {
        /// Minimum allowed length.
        min: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// Contains a character other than ASCII letters, digits or underscore.
    #[error("username can only contain letters, numbers and underscores")]
    InvalidCharacter,
}

/// A normalized username: trimmed, lower-cased, `[a-z0-9_]{3,30}`.
///
/// ```
/// use user_apis_core::Username;
///
/// assert_eq!(Username::parse(" JohnDoe ").unwrap().as_str(), "johndoe");
/// assert!(Username::parse("jo").is_err());
/// assert!(Username::parse("john-doe").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Minimum username length.
    pub const MIN_LENGTH: usize = 3;
    /// Maximum username length.
    pub const MAX_LENGTH: usize = 30;

    /// Parse and normalize a `Username`.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is not 3-30 characters of
    /// ASCII letters, digits or underscores.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        let s = s.trim();

        let len = s.chars().count();
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&len) {
            return Err(UsernameError::Length {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
            });
        }

        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(UsernameError::InvalidCharacter);
        }

        Ok(Self(s.to_ascii_lowercase()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
