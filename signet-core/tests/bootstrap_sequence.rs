//! Sequence-level tests for the bootstrap path
//!
//! These drive the persistence gateway and admin seeding the way the
//! binary does (migrate, then seed, then assemble), over in-memory
//! fakes with the same uniqueness semantics as the Postgres schema.
//!
//! Run with: cargo test --test bootstrap_sequence

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use signet_core::{
    bootstrap::{ensure_admin, LogicalStore, PersistenceGateway, StoreMigrator},
    config::AdminSeedConfig,
    models::{Claim, NewUser, User},
    repository::{CreateOutcome, IdentityStore},
    Error, Result,
};

struct FakeMigrator {
    store: LogicalStore,
    applied: Arc<Mutex<Vec<LogicalStore>>>,
    fail: bool,
}

#[async_trait]
impl StoreMigrator for FakeMigrator {
    fn store(&self) -> LogicalStore {
        self.store
    }

    async fn run(&self) -> Result<()> {
        if self.fail {
            return Err(Error::Internal("connection reset".to_string()));
        }
        self.applied.lock().expect("lock poisoned").push(self.store);
        Ok(())
    }
}

#[derive(Default)]
struct MemoryStore {
    users: Mutex<Vec<User>>,
    claims: Mutex<HashSet<(Uuid, String, String)>>,
}

impl MemoryStore {
    fn user_count(&self) -> usize {
        self.users.lock().expect("lock poisoned").len()
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .expect("lock poisoned")
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_if_absent(&self, user: NewUser) -> Result<CreateOutcome> {
        let mut users = self.users.lock().expect("lock poisoned");
        if let Some(existing) = users.iter().find(|u| u.username == user.username) {
            return Ok(CreateOutcome::Existing(existing.clone()));
        }
        let user = user.into_user();
        users.push(user.clone());
        Ok(CreateOutcome::Created(user))
    }

    async fn add_claims(&self, user_id: Uuid, claims: &[Claim]) -> Result<()> {
        let mut stored = self.claims.lock().expect("lock poisoned");
        for claim in claims {
            stored.insert((user_id, claim.claim_type.clone(), claim.value.clone()));
        }
        Ok(())
    }

    async fn claims_for(&self, user_id: Uuid) -> Result<Vec<Claim>> {
        Ok(self
            .claims
            .lock()
            .expect("lock poisoned")
            .iter()
            .filter(|(id, _, _)| *id == user_id)
            .map(|(_, t, v)| Claim::new(t.clone(), v.clone()))
            .collect())
    }
}

fn gateway(
    failing: Option<LogicalStore>,
) -> (PersistenceGateway, Arc<Mutex<Vec<LogicalStore>>>) {
    let applied = Arc::new(Mutex::new(Vec::new()));
    let migrators = LogicalStore::all()
        .into_iter()
        .map(|store| {
            Box::new(FakeMigrator {
                store,
                applied: applied.clone(),
                fail: failing == Some(store),
            }) as Box<dyn StoreMigrator>
        })
        .collect();
    (PersistenceGateway::new(migrators), applied)
}

fn seed() -> AdminSeedConfig {
    AdminSeedConfig {
        username: "admin".to_string(),
        email: "admin@example.com".to_string(),
        password: "seed-password-1".to_string(),
    }
}

/// The binary's bootstrap chaining: migrate, then seed, then flag
/// pipeline assembly. Any failure short-circuits the rest.
async fn run_sequence(
    gateway: &PersistenceGateway,
    store: &MemoryStore,
    assembled: &mut bool,
) -> Result<User> {
    gateway.migrate().await?;
    let admin = ensure_admin(store, &seed()).await?;
    *assembled = true;
    Ok(admin)
}

#[tokio::test]
async fn test_fresh_store_bootstrap_is_idempotent() {
    let (gateway, _) = gateway(None);
    let store = MemoryStore::default();
    let mut assembled = false;

    let first = run_sequence(&gateway, &store, &mut assembled)
        .await
        .expect("first bootstrap");
    assert!(assembled);
    assert_eq!(first.username, "admin");

    let claims = store.claims_for(first.id).await.expect("claims");
    assert_eq!(claims, vec![Claim::name("admin")]);

    // Second run: no duplicates, no errors, same claim set
    let second = run_sequence(&gateway, &store, &mut assembled)
        .await
        .expect("second bootstrap");
    assert_eq!(first.id, second.id);
    assert_eq!(store.user_count(), 1);
    assert_eq!(
        store.claims_for(first.id).await.expect("claims"),
        vec![Claim::name("admin")]
    );
}

#[tokio::test]
async fn test_grant_migration_failure_prevents_all_later_phases() {
    let (gateway, applied) = gateway(Some(LogicalStore::Grant));
    let store = MemoryStore::default();
    let mut assembled = false;

    let err = run_sequence(&gateway, &store, &mut assembled)
        .await
        .expect_err("grant migration fails");

    assert!(matches!(
        err,
        Error::Migration {
            store: LogicalStore::Grant,
            ..
        }
    ));
    // No store after the failing one was migrated, no principal was
    // created, and assembly was never reached
    assert!(applied.lock().expect("lock poisoned").is_empty());
    assert_eq!(store.user_count(), 0);
    assert!(!assembled);
}

#[tokio::test]
async fn test_identity_migration_failure_leaves_earlier_stores_applied() {
    let (gateway, applied) = gateway(Some(LogicalStore::Identity));
    let store = MemoryStore::default();
    let mut assembled = false;

    run_sequence(&gateway, &store, &mut assembled)
        .await
        .expect_err("identity migration fails");

    assert_eq!(
        *applied.lock().expect("lock poisoned"),
        vec![LogicalStore::Grant, LogicalStore::Configuration]
    );
    assert_eq!(store.user_count(), 0);
    assert!(!assembled);
}
