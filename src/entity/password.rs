use serde::{Deserialize, Serialize};

// Stored per wallet address; overwritten on password change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PasswordRecord {
    pub hash: String,
    pub salt: String,
    pub timestamp: i64,
}
