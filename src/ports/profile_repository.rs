//! ProfileRepository port for profile persistence operations

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::profile::Profile;

/// Repository for per-user profiles.
///
/// # Contract
///
/// - `find_by_owner` returns `Ok(None)` when the user has never saved a profile
/// - `save` is an atomic upsert: after it returns, a read sees exactly the
///   saved collections, never a mix of old and new
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Find the profile owned by a user.
    async fn find_by_owner(&self, owner: &UserId) -> Result<Option<Profile>, DomainError>;

    /// Insert or wholly replace the owner's stored profile.
    async fn save(&self, profile: &Profile) -> Result<(), DomainError>;
}
