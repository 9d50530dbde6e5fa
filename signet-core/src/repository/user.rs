use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::{
    models::{Claim, NewUser, User},
    Result,
};

/// Outcome of an atomic get-or-create on the identity store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(User),
    Existing(User),
}

impl CreateOutcome {
    #[must_use]
    pub fn user(&self) -> &User {
        match self {
            Self::Created(user) | Self::Existing(user) => user,
        }
    }

    #[must_use]
    pub const fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Storage seam for user principals and their claims.
///
/// Uniqueness of `username` is enforced by the store itself, never by
/// a separate existence check, so concurrent bootstrap of multiple
/// instances converges on the store's constraint.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Insert the principal unless one with the same username already
    /// exists, in a single conflict-ignoring statement. Returns which
    /// of the two happened together with the stored principal.
    async fn create_if_absent(&self, user: NewUser) -> Result<CreateOutcome>;

    /// Attach claims to a principal. Conflict-ignoring: claims already
    /// present are left untouched, so the call is safe to repeat.
    async fn add_claims(&self, user_id: Uuid, claims: &[Claim]) -> Result<()>;

    async fn claims_for(&self, user_id: Uuid) -> Result<Vec<Claim>>;
}

/// Postgres-backed identity store.
#[derive(Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &PgRow) -> Result<User> {
        Ok(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            email_confirmed: row.try_get("email_confirmed")?,
            password_hash: row.try_get("password_hash")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, username, email, email_confirmed, password_hash, created_at, updated_at
            FROM users
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn create_if_absent(&self, user: NewUser) -> Result<CreateOutcome> {
        let user = user.into_user();

        let row = sqlx::query(
            r"
            INSERT INTO users (id, username, email, email_confirmed, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (username) DO NOTHING
            RETURNING id, username, email, email_confirmed, password_hash, created_at, updated_at
            ",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(user.email.as_ref())
        .bind(user.email_confirmed)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(CreateOutcome::Created(Self::row_to_user(&row)?));
        }

        // Lost the race (or a prior run already seeded): the unique
        // constraint swallowed the insert, so the principal must exist.
        let existing = self
            .get_by_username(&user.username)
            .await?
            .ok_or_else(|| {
                crate::Error::Internal(format!(
                    "User '{}' neither inserted nor found",
                    user.username
                ))
            })?;

        Ok(CreateOutcome::Existing(existing))
    }

    async fn add_claims(&self, user_id: Uuid, claims: &[Claim]) -> Result<()> {
        for claim in claims {
            sqlx::query(
                r"
                INSERT INTO user_claims (user_id, claim_type, claim_value)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, claim_type, claim_value) DO NOTHING
                ",
            )
            .bind(user_id)
            .bind(&claim.claim_type)
            .bind(&claim.value)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    async fn claims_for(&self, user_id: Uuid) -> Result<Vec<Claim>> {
        let rows = sqlx::query(
            r"
            SELECT claim_type, claim_value
            FROM user_claims
            WHERE user_id = $1
            ORDER BY id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(Claim {
                    claim_type: row.try_get("claim_type")?,
                    value: row.try_get("claim_value")?,
                })
            })
            .collect()
    }
}
