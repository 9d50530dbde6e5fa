//! Store migrators backed by embedded sqlx migrations.
//!
//! Each logical store keeps its own migration directory; the three
//! migrators share the physical database and its `_sqlx_migrations`
//! table, so versions are unique across directories and every migrator
//! ignores versions recorded by the others.

use async_trait::async_trait;
use sqlx::{migrate::Migrator, PgPool};

use signet_core::{
    bootstrap::{LogicalStore, PersistenceGateway, StoreMigrator},
    Error, Result,
};

struct SqlxStoreMigrator {
    store: LogicalStore,
    migrator: Migrator,
    pool: PgPool,
}

impl SqlxStoreMigrator {
    fn new(store: LogicalStore, mut migrator: Migrator, pool: PgPool) -> Self {
        // Versions applied by the other stores' migrators are expected
        migrator.set_ignore_missing(true);
        Self {
            store,
            migrator,
            pool,
        }
    }
}

#[async_trait]
impl StoreMigrator for SqlxStoreMigrator {
    fn store(&self) -> LogicalStore {
        self.store
    }

    async fn run(&self) -> Result<()> {
        self.migrator
            .run(&self.pool)
            .await
            .map_err(|e| Error::Internal(e.to_string()))
    }
}

/// Build the persistence gateway over all three logical stores.
pub fn gateway(pool: &PgPool) -> PersistenceGateway {
    PersistenceGateway::new(vec![
        Box::new(SqlxStoreMigrator::new(
            LogicalStore::Grant,
            sqlx::migrate!("../migrations/grant"),
            pool.clone(),
        )),
        Box::new(SqlxStoreMigrator::new(
            LogicalStore::Configuration,
            sqlx::migrate!("../migrations/configuration"),
            pool.clone(),
        )),
        Box::new(SqlxStoreMigrator::new(
            LogicalStore::Identity,
            sqlx::migrate!("../migrations/identity"),
            pool.clone(),
        )),
    ])
}
