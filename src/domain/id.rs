//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DeployError;

/// Maximum length the platform accepts for an app name.
pub const MAX_APP_NAME_LEN: usize = 63;

/// Platform app name - newtype for type safety.
///
/// Valid names are lowercase ASCII letters, digits and `-`, and neither
/// start nor end with `-`. Construction goes through [`AppName::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppName(String);

impl AppName {
    /// Validate and wrap an app name.
    pub fn parse(name: impl Into<String>) -> Result<Self, DeployError> {
        let name = name.into();
        let invalid = |reason| DeployError::InvalidAppName {
            name: name.clone(),
            reason,
        };

        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if name.len() > MAX_APP_NAME_LEN {
            return Err(invalid("name is longer than 63 characters"));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(invalid("only lowercase letters, digits and '-' are allowed"));
        }
        if name.starts_with('-') || name.ends_with('-') {
            return Err(invalid("name cannot start or end with '-'"));
        }

        Ok(Self(name))
    }

    /// Get the app name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for AppName {
    type Error = DeployError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<AppName> for String {
    fn from(name: AppName) -> Self {
        name.0
    }
}

impl AsRef<str> for AppName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
