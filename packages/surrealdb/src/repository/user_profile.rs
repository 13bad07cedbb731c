use surrealdb::{Connection, Surreal};
use teamroom_entity::types::UserProfile;

use crate::repository::error::RepositoryError;

pub struct UserProfileRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for UserProfileRepository<C> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone() }
    }
}

impl<C: Connection> UserProfileRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    pub async fn upsert(&self, profile: UserProfile) -> Result<UserProfile, RepositoryError> {
        let stored: Option<UserProfile> = self
            .db
            .upsert(("user_profile", profile.user_id.clone()))
            .content(profile)
            .await?;

        stored.ok_or_else(|| {
            RepositoryError::write_failed("store user profile")
        })
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, RepositoryError> {
        let profile: Option<UserProfile> =
            self.db.select(("user_profile", user_id.to_string())).await?;
        Ok(profile)
    }

    /// Display name for `user_id`, falling back to the id itself
    pub async fn display_name(&self, user_id: &str) -> Result<String, RepositoryError> {
        Ok(self
            .get(user_id)
            .await?
            .map(|profile| profile.full_name)
            .unwrap_or_else(|| user_id.to_string()))
    }
}
