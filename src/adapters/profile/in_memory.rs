//! In-memory ProfileRepository.
//!
//! Used when no database is configured and throughout the test suite. A save
//! replaces the owner's entry inside one write-lock critical section, so
//! concurrent readers see either the old profile or the new one.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::profile::Profile;
use crate::ports::ProfileRepository;

#[derive(Debug, Default)]
pub struct InMemoryProfileRepository {
    profiles: RwLock<HashMap<UserId, Profile>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store, replacing any profile with the same owner.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profiles
            .get_mut()
            .insert(profile.owner().clone(), profile);
        self
    }

    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.profiles.read().await.is_empty()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_owner(&self, owner: &UserId) -> Result<Option<Profile>, DomainError> {
        Ok(self.profiles.read().await.get(owner).cloned())
    }

    async fn save(&self, profile: &Profile) -> Result<(), DomainError> {
        self.profiles
            .write()
            .await
            .insert(profile.owner().clone(), profile.clone());
        Ok(())
    }
}
