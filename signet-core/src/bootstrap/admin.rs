//! Administrative principal seeding

use tracing::info;

use crate::{
    config::AdminSeedConfig,
    models::{Claim, NewUser, User},
    repository::{CreateOutcome, IdentityStore},
    service::hash_password,
    Error, Result,
};

/// Ensure exactly one administrative principal exists with its claim
/// set attached.
///
/// Runs after migrations, before service construction. Creation is an
/// atomic get-or-create against the store's username constraint, so
/// concurrent bootstrap of several instances is safe. Claim attachment
/// is conflict-ignoring and performed even when the principal already
/// exists: a prior run that died between creation and claim attachment
/// is healed here.
///
/// # Errors
///
/// * `SeedCreation` if the principal cannot be created
/// * `SeedClaim` if claim attachment fails (retryable on next startup)
pub async fn ensure_admin(store: &dyn IdentityStore, seed: &AdminSeedConfig) -> Result<User> {
    let password_hash = hash_password(&seed.password)
        .await
        .map_err(|e| Error::SeedCreation(e.to_string()))?;

    let outcome = store
        .create_if_absent(NewUser {
            username: seed.username.clone(),
            email: Some(seed.email.clone()),
            // Seeded directly by the operator; no confirmation flow
            email_confirmed: true,
            password_hash,
        })
        .await
        .map_err(|e| Error::SeedCreation(e.to_string()))?;

    match &outcome {
        CreateOutcome::Created(user) => {
            info!(
                username = %user.username,
                id = %user.id,
                "Administrative principal created"
            );
        }
        CreateOutcome::Existing(user) => {
            info!(
                username = %user.username,
                "Administrative principal already exists, skipping creation"
            );
        }
    }

    let user = outcome.user().clone();

    let claims = [Claim::name(&seed.username)];
    store
        .add_claims(user.id, &claims)
        .await
        .map_err(|e| Error::SeedClaim(e.to_string()))?;

    Ok(user)
}
