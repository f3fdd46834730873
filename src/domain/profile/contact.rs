//! Contact value object

use serde::Serialize;

use crate::domain::foundation::ValidationError;

/// A link to an external channel, e.g. `LINKEDIN` → profile URL.
///
/// Both parts are non-blank. Equality and ordering cover the whole pair, so
/// two contacts with the same code but different values are distinct.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Contact {
    code: String,
    value: String,
}

impl Contact {
    pub fn new(code: impl Into<String>, value: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        let value = value.into();
        if is_blank(&code) {
            return Err(ValidationError::empty_field("code"));
        }
        if is_blank(&value) {
            return Err(ValidationError::empty_field("value"));
        }
        Ok(Self { code, value })
    }

    /// Channel name, e.g. `LINKEDIN`.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Channel-specific identifier or URL.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Empty or whitespace-only.
pub(crate) fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
