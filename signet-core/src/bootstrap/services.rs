//! Service container construction
//!
//! The container replaces a process-wide registry slot with explicit
//! dependency injection: it is built exactly once, at the end of
//! bootstrap, and the resulting handle flows into the request pipeline
//! as shared state. Nothing mutates it after publication and there is
//! no teardown.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use crate::{
    bootstrap::credential::SigningCredential,
    localization::LocalizationPolicy,
    repository::{IdentityStore, PgIdentityStore},
    Config, Result,
};

/// Container for all resolved services.
pub struct Services {
    pub config: Arc<Config>,
    /// Identity store backing principal lookups
    pub identity_store: Arc<dyn IdentityStore>,
    /// Culture negotiation policy consumed by the localization stage
    pub localization: Arc<LocalizationPolicy>,
    /// Credential the protocol engine signs tokens with
    pub signing: SigningCredential,
    /// Shared connection pool (read-only shared resource after startup)
    pub pool: PgPool,
}

/// Shared reference to the published service container. Cloning the
/// handle is cheap; the container itself is never cloned or replaced.
pub type RegistryHandle = Arc<Services>;

/// Build the service container. Called exactly once, after migrations
/// and admin seeding have completed.
pub fn init_services(
    pool: PgPool,
    config: Arc<Config>,
    signing: SigningCredential,
) -> Result<RegistryHandle> {
    info!("Initializing services...");

    let identity_store: Arc<dyn IdentityStore> = Arc::new(PgIdentityStore::new(pool.clone()));
    info!("Identity store initialized");

    let localization = Arc::new(LocalizationPolicy::from_config(&config.localization));
    info!(
        default_culture = %localization.default_culture(),
        default_ui_culture = %localization.default_ui_culture(),
        "Localization policy initialized"
    );

    if signing.is_ephemeral() {
        info!("Signing credential: ephemeral developer key");
    } else {
        info!("Signing credential: provisioned key file");
    }

    Ok(Arc::new(Services {
        config,
        identity_store,
        localization,
        signing,
        pool,
    }))
}
