//! HTTP DTOs for profile endpoints.
//!
//! These types decouple the HTTP API from domain types. The wire name
//! `mailNotifications` maps to the domain's `notification_preferences`.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthenticatedUser, DomainError, FieldViolation};
use crate::domain::profile::{
    Contact, ContactDraft, Profile, ProfileUpdateRequest, NOTIFICATION_PREFERENCES_FIELD,
};

const MAIL_NOTIFICATIONS_FIELD: &str = "mailNotifications";

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of `PUT /api/profile/`.
///
/// Unknown fields (including a client-supplied `id`) are ignored; the owner
/// always comes from the authenticated identity.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub mail_notifications: Option<Vec<String>>,
    #[serde(default)]
    pub contacts: Option<Vec<ContactPayload>>,
}

/// A contact entry as sent by the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactPayload {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdateRequest {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            notification_preferences: req.mail_notifications,
            contacts: req.contacts.map(|contacts| {
                contacts
                    .into_iter()
                    .map(|c| ContactDraft {
                        code: c.code,
                        value: c.value,
                    })
                    .collect()
            }),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of `GET /api/profile/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub email: String,
    pub mail_notifications: Vec<String>,
    pub contacts: Vec<ContactResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactResponse {
    pub code: String,
    pub value: String,
}

impl From<&Contact> for ContactResponse {
    fn from(contact: &Contact) -> Self {
        Self {
            code: contact.code().to_string(),
            value: contact.value().to_string(),
        }
    }
}

impl ProfileResponse {
    pub fn new(user: &AuthenticatedUser, profile: &Profile) -> Self {
        Self {
            id: profile.owner().to_string(),
            email: user.email.clone(),
            mail_notifications: profile.notification_preferences().iter().cloned().collect(),
            contacts: profile.contacts().iter().map(ContactResponse::from).collect(),
        }
    }
}

/// A violation with its field path in wire naming.
#[derive(Debug, Clone, Serialize)]
pub struct ViolationResponse {
    pub field: String,
    pub rule: String,
    pub message: String,
}

impl From<&FieldViolation> for ViolationResponse {
    fn from(violation: &FieldViolation) -> Self {
        Self {
            field: wire_field(&violation.field),
            rule: violation.rule.to_string(),
            message: violation.message.clone(),
        }
    }
}

/// Rewrites a domain field path into the name the client sent.
fn wire_field(field: &str) -> String {
    match field.strip_prefix(NOTIFICATION_PREFERENCES_FIELD) {
        Some(rest) => format!("{}{}", MAIL_NOTIFICATIONS_FIELD, rest),
        None => field.to_string(),
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    /// Validation failure listing every violation.
    pub fn validation_failed(error: &DomainError) -> Self {
        let violations: Vec<ViolationResponse> =
            error.violations.iter().map(ViolationResponse::from).collect();
        let message = match violations.as_slice() {
            [single] => format!("Validation failed: {} {}", single.field, single.message),
            _ => error.message().to_string(),
        };
        Self {
            code: error.code().to_string(),
            message,
            details: Some(serde_json::json!({ "violations": violations })),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            details: None,
        }
    }
}
