use thiserror::Error;

use crate::bootstrap::migrate::LogicalStore;

#[derive(Error, Debug)]
pub enum Error {
    /// A logical store failed to reach its latest schema version.
    /// Fatal for startup; never retried automatically.
    #[error("Migration of {store} store failed: {message}")]
    Migration {
        store: LogicalStore,
        message: String,
    },

    /// The administrative principal could not be created. The message
    /// is the first reported validation error.
    #[error("Admin seeding failed: {0}")]
    SeedCreation(String),

    /// The principal exists but claim attachment failed. Retryable on
    /// the next startup: the principal lookup will succeed and claim
    /// attachment is conflict-ignoring.
    #[error("Admin claim attachment failed: {0}")]
    SeedClaim(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            // Map "no rows" to NotFound
            sqlx::Error::RowNotFound => Self::NotFound("Resource not found".to_string()),
            // Map constraint violations to domain errors
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().unwrap_or_default();
                match code.as_ref() {
                    // PostgreSQL unique_violation
                    "23505" => {
                        let detail = db_err.message().to_string();
                        if detail.contains("username") {
                            Self::AlreadyExists("Username already taken".to_string())
                        } else {
                            Self::AlreadyExists("Resource already exists".to_string())
                        }
                    }
                    // PostgreSQL foreign_key_violation
                    "23503" => Self::NotFound("Referenced resource not found".to_string()),
                    // PostgreSQL check_violation
                    "23514" => Self::InvalidInput("Constraint check failed".to_string()),
                    // PostgreSQL not_null_violation
                    "23502" => Self::InvalidInput("Required field is missing".to_string()),
                    _ => Self::Database(err),
                }
            }
            _ => Self::Database(err),
        }
    }
}

impl Error {
    /// Whether this error aborts the bootstrap phase. All bootstrap
    /// errors are fatal; this distinguishes them from request-phase
    /// errors when logging at the entry point.
    #[must_use]
    pub const fn is_bootstrap_fatal(&self) -> bool {
        matches!(
            self,
            Self::Migration { .. } | Self::SeedCreation(_) | Self::SeedClaim(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_bootstrap_fatal_classification() {
        assert!(Error::Migration {
            store: LogicalStore::Grant,
            message: "boom".to_string(),
        }
        .is_bootstrap_fatal());
        assert!(Error::SeedCreation("bad password".to_string()).is_bootstrap_fatal());
        assert!(Error::SeedClaim("insert failed".to_string()).is_bootstrap_fatal());
        assert!(!Error::NotFound("user".to_string()).is_bootstrap_fatal());
    }

    #[test]
    fn test_migration_error_names_store() {
        let err = Error::Migration {
            store: LogicalStore::Configuration,
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("configuration"));
    }
}
