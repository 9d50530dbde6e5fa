pub mod user;

pub use user::{CreateOutcome, IdentityStore, PgIdentityStore};
