//! Strongly-typed object identifiers.
//!
//! All tenant/integration/user/provider ids are 24-hex-character strings,
//! matching the format the callback state parameter is validated against.
//! Wrapping them in a newtype means an invalid id can never reach storage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::OAuthCallbackError;

/// A 24-hex-character object id (tenant, integration, user, or provider).
///
/// Deserializes via `TryFrom<String>` rather than `#[serde(transparent)]`, so
/// a malformed id embedded in a state parameter is rejected as
/// `InvalidStateStructure` at decode time instead of reaching storage as a
/// bare, unvalidated `String`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Returns true if `value` is a well-formed 24-hex-character id.
    #[must_use]
    pub fn is_valid(value: &str) -> bool {
        value.len() == 24 && value.bytes().all(|b| b.is_ascii_hexdigit())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl FromStr for ObjectId {
    type Err = OAuthCallbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if Self::is_valid(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(OAuthCallbackError::InvalidStateStructure(format!(
                "{s} is not a 24-hex-character object id"
            )))
        }
    }
}

impl TryFrom<String> for ObjectId {
    type Error = OAuthCallbackError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if Self::is_valid(&value) {
            Ok(Self(value))
        } else {
            Err(OAuthCallbackError::InvalidStateStructure(format!(
                "{value} is not a 24-hex-character object id"
            )))
        }
    }
}

impl From<ObjectId> for String {
    fn from(value: ObjectId) -> Self {
        value.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
