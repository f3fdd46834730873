//! HTTP routes for profile endpoints.

use axum::{routing::get, Router};

use super::handlers::{get_profile, update_profile, ProfileHandlers};

/// Creates the profile router.
///
/// Served at both `/api/profile` and `/api/profile/`; clients use the
/// trailing-slash form.
pub fn profile_routes(handlers: ProfileHandlers) -> Router {
    Router::new()
        .route("/api/profile", get(get_profile).put(update_profile))
        .route("/api/profile/", get(get_profile).put(update_profile))
        .with_state(handlers)
}
