//! HTTP adapters - REST API implementations.
//!
//! `build_router` assembles the full API: profile endpoints, a health check,
//! bearer-token authentication, request ids and request tracing.

pub mod middleware;
pub mod profile;

use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub use middleware::{auth_middleware, AuthState, RequireAuth};
pub use profile::{profile_routes, ProfileHandlers};

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Creates the application router.
///
/// Transport concerns that depend on deployment (CORS, timeouts) are layered
/// by the binary.
pub fn build_router(handlers: ProfileHandlers, validator: AuthState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(profile_routes(handlers))
        .layer(from_fn_with_state(validator, auth_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}
