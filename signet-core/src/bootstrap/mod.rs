//! Bootstrap sequence for the Signet identity provider
//!
//! This module handles:
//! - Configuration loading
//! - Database pool initialization
//! - Schema migration across the three logical stores
//! - Administrative principal seeding
//! - Signing-credential selection
//! - Service container construction (the registry handle)
//!
//! The sequence is strictly ordered and every failure is fatal: the
//! process must never reach a request-serving state against a
//! half-migrated or admin-less store.

pub mod admin;
pub mod config;
pub mod credential;
pub mod database;
pub mod migrate;
pub mod services;

pub use admin::ensure_admin;
pub use config::load_config;
pub use credential::{select_signing_credential, SigningCredential};
pub use database::init_database;
pub use migrate::{LogicalStore, PersistenceGateway, StoreMigrator};
pub use services::{init_services, RegistryHandle, Services};
