mod migrations;
mod server;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info};

use signet_api::PipelineAssembler;
use signet_core::{
    bootstrap::{
        ensure_admin, init_database, init_services, load_config, select_signing_credential,
        RegistryHandle,
    },
    logging,
    repository::PgIdentityStore,
    Config,
};

use server::SignetServer;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load and validate configuration (fail fast on misconfigurations)
    let config = load_config()?;

    // 2. Initialize logging
    logging::init_logging(&config.logging)?;
    info!("Signet identity provider starting...");
    info!("HTTP address: {}", config.http_address());
    info!("Issuer: {}", config.server.issuer);
    info!("Environment: {:?}", config.server.environment);

    // 3. Run the bootstrap sequence under the startup deadline. Every
    // failure here is fatal: the process must never serve requests
    // against a half-migrated or admin-less store.
    let deadline = Duration::from_secs(config.startup.timeout_seconds);
    let registry = match tokio::time::timeout(deadline, bootstrap(config)).await {
        Ok(Ok(registry)) => registry,
        Ok(Err(e)) => {
            error!("Startup failed: {:#}", e);
            return Err(e);
        }
        Err(_) => {
            error!("Startup deadline of {}s exceeded", deadline.as_secs());
            return Err(anyhow::anyhow!(
                "Startup deadline of {}s exceeded",
                deadline.as_secs()
            ));
        }
    };

    // 8. Assemble the request pipeline. The protocol engine mounts its
    // routes here; an empty router keeps the discovery surface only.
    let (router, stages) = PipelineAssembler::new(registry.clone()).assemble(axum::Router::new());
    info!("Pipeline: {}", stages);

    // 9. Serve until shutdown
    let server = SignetServer::new(registry, router);
    server.start().await
}

/// Ordered bootstrap: pool, migrations, admin seeding, signing
/// credential, service container.
async fn bootstrap(config: Config) -> Result<RegistryHandle> {
    let config = Arc::new(config);

    // 4. Database pool
    let pool = init_database(&config).await?;

    // 5. Migrate every logical store (grant -> configuration -> identity)
    let gateway = migrations::gateway(&pool);
    gateway.migrate().await?;

    // 6. Seed the administrative principal
    let identity_store = PgIdentityStore::new(pool.clone());
    let admin = ensure_admin(&identity_store, &config.admin).await?;
    info!(username = %admin.username, "Administrative principal ready");

    // 7. Signing credential and service container
    let signing = select_signing_credential(&config.signing, config.server.environment)?;
    let registry = init_services(pool, config, signing)?;

    Ok(registry)
}
