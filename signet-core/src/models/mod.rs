pub mod user;

pub use user::{Claim, NewUser, User, CLAIM_TYPE_NAME};
