//! UpdateProfile - Command handler for replacing the caller's profile.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::profile::{Profile, ProfileUpdateRequest};
use crate::ports::ProfileRepository;

/// Command to replace the mutable fields of `owner`'s profile.
#[derive(Debug, Clone)]
pub struct UpdateProfileCommand {
    pub owner: UserId,
    pub request: ProfileUpdateRequest,
}

/// Handler for profile updates.
///
/// The request is validated before the repository is touched; a rejected
/// request performs no reads and no writes.
pub struct UpdateProfileHandler {
    repository: Arc<dyn ProfileRepository>,
}

impl UpdateProfileHandler {
    pub fn new(repository: Arc<dyn ProfileRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, cmd: UpdateProfileCommand) -> Result<(), DomainError> {
        // 1. Validate the whole candidate
        let update = cmd.request.validate().map_err(|err| {
            tracing::warn!(
                owner = %cmd.owner,
                violations = err.violations.len(),
                "Profile update rejected"
            );
            DomainError::from(err)
        })?;

        // 2. Load the current profile, or start from an empty one
        let mut profile = self
            .repository
            .find_by_owner(&cmd.owner)
            .await?
            .unwrap_or_else(|| Profile::new(cmd.owner.clone()));

        // 3. Replace and persist
        profile.replace(update);
        self.repository.save(&profile).await?;

        tracing::info!(
            owner = %cmd.owner,
            notification_preferences = profile.notification_preferences().len(),
            contacts = profile.contacts().len(),
            "Profile updated"
        );
        Ok(())
    }
}
