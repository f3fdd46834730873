//! PostgreSQL implementation of ProfileRepository.
//!
//! A profile is one `profiles` row plus child rows in `profile_notifications`
//! and `profile_contacts`. `save` rewrites the children inside a single
//! transaction; the upsert on `profiles` row-locks the owner, so concurrent
//! saves for the same user serialize instead of interleaving.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::domain::foundation::{DomainError, UserId, ValidationError};
use crate::domain::profile::{Contact, Profile};
use crate::ports::ProfileRepository;

/// PostgreSQL implementation of the ProfileRepository port.
pub struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool from configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DomainError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| DomainError::database("database.url is not configured"))?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout())
            .connect(url)
            .await
            .map_err(db_error)?;
        Ok(Self::new(pool))
    }

    /// Applies pending migrations from `migrations/`.
    pub async fn migrate(&self) -> Result<(), DomainError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Profile migrations failed: {}", e);
                DomainError::database(format!("Migration failed: {}", e))
            })
    }
}

fn db_error(e: sqlx::Error) -> DomainError {
    tracing::error!("Profile repository query failed: {}", e);
    DomainError::database(format!("Database error: {}", e))
}

/// Builds the aggregate from stored rows, re-checking its invariants.
///
/// Rows that break them are a storage fault, not a client error.
fn assemble(
    owner: UserId,
    preferences: Vec<String>,
    contacts: Vec<(String, String)>,
) -> Result<Profile, DomainError> {
    let corrupt = |e: ValidationError| {
        tracing::error!(owner = %owner, "Stored profile is invalid: {}", e);
        DomainError::database(format!("Corrupt profile row: {}", e))
    };
    let contacts = contacts
        .into_iter()
        .map(|(code, value)| Contact::new(code, value))
        .collect::<Result<Vec<_>, _>>()
        .map_err(corrupt)?;
    Profile::reconstitute(owner.clone(), preferences, contacts).map_err(corrupt)
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_by_owner(&self, owner: &UserId) -> Result<Option<Profile>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        let exists: Option<(String,)> =
            sqlx::query_as("SELECT owner_id FROM profiles WHERE owner_id = $1")
                .bind(owner.as_str())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error)?;
        if exists.is_none() {
            tx.commit().await.map_err(db_error)?;
            return Ok(None);
        }

        let preferences: Vec<(String,)> = sqlx::query_as(
            "SELECT preference FROM profile_notifications WHERE owner_id = $1 ORDER BY preference",
        )
        .bind(owner.as_str())
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error)?;

        let contacts: Vec<(String, String)> = sqlx::query_as(
            "SELECT code, value FROM profile_contacts WHERE owner_id = $1 ORDER BY code, value",
        )
        .bind(owner.as_str())
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;

        let preferences = preferences.into_iter().map(|(p,)| p).collect();
        assemble(owner.clone(), preferences, contacts).map(Some)
    }

    async fn save(&self, profile: &Profile) -> Result<(), DomainError> {
        let owner = profile.owner().as_str();
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query(
            r#"
            INSERT INTO profiles (owner_id) VALUES ($1)
            ON CONFLICT (owner_id) DO UPDATE SET updated_at = now()
            "#,
        )
        .bind(owner)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        sqlx::query("DELETE FROM profile_notifications WHERE owner_id = $1")
            .bind(owner)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        for preference in profile.notification_preferences() {
            sqlx::query("INSERT INTO profile_notifications (owner_id, preference) VALUES ($1, $2)")
                .bind(owner)
                .bind(preference.as_str())
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        sqlx::query("DELETE FROM profile_contacts WHERE owner_id = $1")
            .bind(owner)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        for contact in profile.contacts() {
            sqlx::query("INSERT INTO profile_contacts (owner_id, code, value) VALUES ($1, $2, $3)")
                .bind(owner)
                .bind(contact.code())
                .bind(contact.value())
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        // Dropping the transaction without commit rolls everything back.
        tx.commit().await.map_err(db_error)?;
        tracing::debug!(owner = %profile.owner(), "Profile rows replaced");
        Ok(())
    }
}

impl std::fmt::Debug for PostgresProfileRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresProfileRepository")
            .field("pool_size", &self.pool.size())
            .finish_non_exhaustive()
    }
}
