use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claim type attached to the seeded administrative principal.
pub const CLAIM_TYPE_NAME: &str = "name";

/// A user principal in the identity store.
///
/// The bootstrap path only ever creates one of these (the
/// administrative principal); everything else is managed by the
/// external identity surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub email_confirmed: bool,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert form of a principal. `username` is the unique key; the store
/// enforces uniqueness, not the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub email_confirmed: bool,
    pub password_hash: String,
}

impl NewUser {
    #[must_use]
    pub fn into_user(self) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: self.username,
            email: self.email,
            email_confirmed: self.email_confirmed,
            password_hash: self.password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A typed key/value attribute attached to a principal, consumed by
/// the protocol engine when issuing tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    #[must_use]
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }

    /// The `name` claim for a principal.
    #[must_use]
    pub fn name(value: impl Into<String>) -> Self {
        Self::new(CLAIM_TYPE_NAME, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_into_user_assigns_id() {
        let user = NewUser {
            username: "admin".to_string(),
            email: Some("admin@example.com".to_string()),
            email_confirmed: true,
            password_hash: "$argon2id$stub".to_string(),
        }
        .into_user();

        assert_eq!(user.username, "admin");
        assert!(user.email_confirmed);
        assert_ne!(user.id, Uuid::nil());
    }

    #[test]
    fn test_name_claim() {
        let claim = Claim::name("admin");
        assert_eq!(claim.claim_type, CLAIM_TYPE_NAME);
        assert_eq!(claim.value, "admin");
    }
}
