//! Profile update validation.
//!
//! A `ProfileUpdateRequest` is the raw candidate as the client sent it: either
//! collection may be absent and any member may be blank. `validate` runs every
//! rule, collects every violation, and only on a clean pass yields a
//! `ProfileUpdate`, the one type `Profile::replace` accepts.
//!
//! Rules, in evaluation order:
//!
//! 1. `notification_preferences` is present (an empty list is fine)
//! 2. `contacts` is present (an empty list is fine)
//! 3. each notification preference is non-blank
//! 4. each contact `code` and `value` is non-blank (absent counts as blank)

use std::collections::BTreeSet;

use thiserror::Error;

use crate::domain::foundation::{DomainError, FieldViolation};

use super::contact::{is_blank, Contact};

pub const NOTIFICATION_PREFERENCES_FIELD: &str = "notification_preferences";
pub const CONTACTS_FIELD: &str = "contacts";

/// A contact as submitted, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    pub code: Option<String>,
    pub value: Option<String>,
}

impl ContactDraft {
    pub fn new(code: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            value: Some(value.into()),
        }
    }
}

/// Candidate replacement for a profile's mutable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdateRequest {
    pub notification_preferences: Option<Vec<String>>,
    pub contacts: Option<Vec<ContactDraft>>,
}

/// A validated update. Only constructible through `ProfileUpdateRequest::validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    notification_preferences: BTreeSet<String>,
    contacts: BTreeSet<Contact>,
}

impl ProfileUpdate {
    pub fn notification_preferences(&self) -> &BTreeSet<String> {
        &self.notification_preferences
    }

    pub fn contacts(&self) -> &BTreeSet<Contact> {
        &self.contacts
    }

    pub(super) fn into_parts(self) -> (BTreeSet<String>, BTreeSet<Contact>) {
        (self.notification_preferences, self.contacts)
    }
}

/// Every rule the request broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("profile update rejected: {} violation(s)", violations.len())]
pub struct ProfileValidationError {
    pub violations: Vec<FieldViolation>,
}

impl From<ProfileValidationError> for DomainError {
    fn from(err: ProfileValidationError) -> Self {
        DomainError::invalid(err.violations)
    }
}

impl ProfileUpdateRequest {
    pub fn new(notification_preferences: Vec<String>, contacts: Vec<ContactDraft>) -> Self {
        Self {
            notification_preferences: Some(notification_preferences),
            contacts: Some(contacts),
        }
    }

    /// Checks every rule; accepts only if none is violated.
    pub fn validate(self) -> Result<ProfileUpdate, ProfileValidationError> {
        let mut violations = Vec::new();

        if self.notification_preferences.is_none() {
            violations.push(FieldViolation::required(NOTIFICATION_PREFERENCES_FIELD));
        }
        if self.contacts.is_none() {
            violations.push(FieldViolation::required(CONTACTS_FIELD));
        }

        let preferences = self.notification_preferences.unwrap_or_default();
        for (i, preference) in preferences.iter().enumerate() {
            if is_blank(preference) {
                violations.push(FieldViolation::not_blank(format!(
                    "{}[{}]",
                    NOTIFICATION_PREFERENCES_FIELD, i
                )));
            }
        }

        let mut contacts = BTreeSet::new();
        for (i, draft) in self.contacts.unwrap_or_default().into_iter().enumerate() {
            let code = draft.code.unwrap_or_default();
            let value = draft.value.unwrap_or_default();
            match Contact::new(code.as_str(), value.as_str()) {
                Ok(contact) => {
                    contacts.insert(contact);
                }
                Err(_) => {
                    // Report each blank member, not just the first one `new` hit
                    for (member, text) in [("code", &code), ("value", &value)] {
                        if is_blank(text) {
                            violations.push(FieldViolation::not_blank(format!(
                                "{}[{}].{}",
                                CONTACTS_FIELD, i, member
                            )));
                        }
                    }
                }
            }
        }

        if !violations.is_empty() {
            return Err(ProfileValidationError { violations });
        }

        Ok(ProfileUpdate {
            notification_preferences: preferences.into_iter().collect(),
            contacts,
        })
    }
}
