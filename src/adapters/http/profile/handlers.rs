//! HTTP handlers for profile endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::profile::{
    GetProfileHandler, GetProfileQuery, UpdateProfileCommand, UpdateProfileHandler,
};
use crate::domain::foundation::{DomainError, ErrorCode};

use super::dto::{ErrorResponse, ProfileResponse, UpdateProfileRequest};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ProfileHandlers {
    get_handler: Arc<GetProfileHandler>,
    update_handler: Arc<UpdateProfileHandler>,
}

impl ProfileHandlers {
    pub fn new(
        get_handler: Arc<GetProfileHandler>,
        update_handler: Arc<UpdateProfileHandler>,
    ) -> Self {
        Self {
            get_handler,
            update_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/profile/ - The caller's profile
pub async fn get_profile(
    State(handlers): State<ProfileHandlers>,
    RequireAuth(user): RequireAuth,
) -> Response {
    let query = GetProfileQuery {
        owner: user.id.clone(),
    };

    match handlers.get_handler.handle(query).await {
        Ok(profile) => (StatusCode::OK, Json(ProfileResponse::new(&user, &profile))).into_response(),
        Err(e) => handle_profile_error(e),
    }
}

/// PUT /api/profile/ - Replace the caller's preferences and contacts
///
/// The body is extracted after `RequireAuth`, so an anonymous request gets
/// 401 whatever it sent.
pub async fn update_profile(
    State(handlers): State<ProfileHandlers>,
    RequireAuth(user): RequireAuth,
    body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(user_id = %user.id, "Unreadable profile body: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(rejection.body_text())),
            )
                .into_response();
        }
    };

    let cmd = UpdateProfileCommand {
        owner: user.id,
        request: req.into(),
    };

    match handlers.update_handler.handle(cmd).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => handle_profile_error(e),
    }
}

fn handle_profile_error(error: DomainError) -> Response {
    match error.code() {
        ErrorCode::ValidationFailed => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::validation_failed(&error)),
        )
            .into_response(),
        ErrorCode::DatabaseError => {
            tracing::error!("Profile request failed: {}", error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("An unexpected error occurred")),
            )
                .into_response()
        }
    }
}
