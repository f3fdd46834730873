//! HTTP adapter for profile endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ContactPayload, ContactResponse, ErrorResponse, ProfileResponse, UpdateProfileRequest,
    ViolationResponse,
};
pub use handlers::ProfileHandlers;
pub use routes::profile_routes;
