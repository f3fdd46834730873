//! GetProfile - Query handler for reading the caller's profile.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::profile::Profile;
use crate::ports::ProfileRepository;

/// Query for the profile owned by `owner`.
#[derive(Debug, Clone)]
pub struct GetProfileQuery {
    pub owner: UserId,
}

/// Handler for reading profiles.
///
/// A user who has never saved a profile gets an empty one; reads never write.
pub struct GetProfileHandler {
    repository: Arc<dyn ProfileRepository>,
}

impl GetProfileHandler {
    pub fn new(repository: Arc<dyn ProfileRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: GetProfileQuery) -> Result<Profile, DomainError> {
        let profile = self
            .repository
            .find_by_owner(&query.owner)
            .await?
            .unwrap_or_else(|| {
                tracing::debug!(owner = %query.owner, "No stored profile, returning empty one");
                Profile::new(query.owner.clone())
            });
        Ok(profile)
    }
}
