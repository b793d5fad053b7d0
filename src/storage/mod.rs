use anyhow::Result;
use async_trait::async_trait;

pub mod memory;
pub mod repository;
pub mod sqlite;

pub use memory::MemoryStore;
pub use repository::{AddressRecord, AddressRepository};
pub use sqlite::SqliteStore;

// Key namespaces. The address is appended lowercased.
pub const TRANSACTIONS_KEY: &str = "paylink_transactions_";
pub const REWARDS_BALANCE_KEY: &str = "PayLink_rewards_";
pub const REWARDS_HISTORY_KEY: &str = "PayLink_rewards_history_";
pub const SPLIT_BILLS_KEY: &str = "PayLink_split_bills_";
pub const PASSWORD_KEY: &str = "payfi_password_";
pub const SESSION_USER_KEY: &str = "paylink_user";

// Oldest entries are dropped past these sizes.
pub const MAX_TRANSACTIONS: usize = 100;
pub const MAX_REWARD_HISTORY: usize = 100;
pub const MAX_SPLIT_BILLS: usize = 50;

/// String-keyed, string-valued store standing in for browser local storage.
///
/// No atomicity is offered across a read-modify-write cycle: two writers on
/// the same key can overwrite each other.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}
