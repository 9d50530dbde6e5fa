//! Persistence gateway: brings every logical store to its latest
//! schema version before anything else runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Error, Result};

/// One of the three schema domains sharing the physical database.
///
/// The enum order is the mandated migration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalStore {
    /// Issued token/consent state for the protocol engine
    Grant,
    /// Registered client and resource definitions
    Configuration,
    /// User principals, credentials, and claims
    Identity,
}

impl LogicalStore {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Grant => "grant",
            Self::Configuration => "configuration",
            Self::Identity => "identity",
        }
    }

    /// All stores in migration order.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Grant, Self::Configuration, Self::Identity]
    }
}

impl std::fmt::Display for LogicalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Applies pending schema changes for a single logical store.
///
/// Invoking `run` with nothing pending must be a no-op (sqlx migrate
/// semantics for the real migrators).
#[async_trait]
pub trait StoreMigrator: Send + Sync {
    fn store(&self) -> LogicalStore;

    async fn run(&self) -> Result<()>;
}

/// Runs every store's migrations in the fixed order
/// grant -> configuration -> identity, aborting on the first failure.
pub struct PersistenceGateway {
    migrators: Vec<Box<dyn StoreMigrator>>,
}

impl PersistenceGateway {
    /// Build the gateway. Migrators are reordered into the mandated
    /// store order regardless of how they were supplied.
    #[must_use]
    pub fn new(mut migrators: Vec<Box<dyn StoreMigrator>>) -> Self {
        migrators.sort_by_key(|m| m.store());
        Self { migrators }
    }

    /// The stores this gateway will migrate, in execution order.
    #[must_use]
    pub fn stores(&self) -> Vec<LogicalStore> {
        self.migrators.iter().map(|m| m.store()).collect()
    }

    /// Apply all pending schema changes, store by store. Any failure
    /// is fatal and propagated unrecovered; stores after the failing
    /// one are not touched.
    pub async fn migrate(&self) -> Result<()> {
        for migrator in &self.migrators {
            let store = migrator.store();
            info!("Migrating {} store...", store);

            migrator.run().await.map_err(|e| Error::Migration {
                store,
                message: e.to_string(),
            })?;

            info!("{} store is at its latest schema version", store);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct RecordingMigrator {
        store: LogicalStore,
        log: Arc<Mutex<Vec<LogicalStore>>>,
        fail: bool,
    }

    #[async_trait]
    impl StoreMigrator for RecordingMigrator {
        fn store(&self) -> LogicalStore {
            self.store
        }

        async fn run(&self) -> Result<()> {
            self.log.lock().expect("lock poisoned").push(self.store);
            if self.fail {
                Err(Error::Internal("simulated failure".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn gateway_with(
        specs: &[(LogicalStore, bool)],
    ) -> (PersistenceGateway, Arc<Mutex<Vec<LogicalStore>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let migrators = specs
            .iter()
            .map(|&(store, fail)| {
                Box::new(RecordingMigrator {
                    store,
                    log: log.clone(),
                    fail,
                }) as Box<dyn StoreMigrator>
            })
            .collect();
        (PersistenceGateway::new(migrators), log)
    }

    #[tokio::test]
    async fn test_migrates_in_fixed_order_regardless_of_input_order() {
        let (gateway, log) = gateway_with(&[
            (LogicalStore::Identity, false),
            (LogicalStore::Grant, false),
            (LogicalStore::Configuration, false),
        ]);

        gateway.migrate().await.expect("migration succeeds");

        assert_eq!(
            *log.lock().expect("lock poisoned"),
            vec![
                LogicalStore::Grant,
                LogicalStore::Configuration,
                LogicalStore::Identity
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_aborts_before_later_stores() {
        let (gateway, log) = gateway_with(&[
            (LogicalStore::Grant, false),
            (LogicalStore::Configuration, true),
            (LogicalStore::Identity, false),
        ]);

        let err = gateway.migrate().await.expect_err("must fail");
        assert!(matches!(
            err,
            Error::Migration {
                store: LogicalStore::Configuration,
                ..
            }
        ));

        // Identity store never touched
        assert_eq!(
            *log.lock().expect("lock poisoned"),
            vec![LogicalStore::Grant, LogicalStore::Configuration]
        );
    }

    #[tokio::test]
    async fn test_repeat_invocation_is_safe() {
        let (gateway, log) = gateway_with(&[
            (LogicalStore::Grant, false),
            (LogicalStore::Configuration, false),
            (LogicalStore::Identity, false),
        ]);

        gateway.migrate().await.expect("first run");
        gateway.migrate().await.expect("second run");

        assert_eq!(log.lock().expect("lock poisoned").len(), 6);
    }

    #[test]
    fn test_store_order_constant() {
        assert_eq!(
            LogicalStore::all(),
            [
                LogicalStore::Grant,
                LogicalStore::Configuration,
                LogicalStore::Identity
            ]
        );
    }
}
