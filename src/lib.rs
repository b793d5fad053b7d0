pub mod chain;
pub mod config;
pub mod di;
pub mod entity;
pub mod interactor;
pub mod qrcodeutils;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export commonly used items
pub use chain::{create_http_provider, HttpProvider, NetworkConfig, ShardeumClient, WalletProvider};
pub use config::AppConfig;
pub use di::*;
pub use entity::*;
pub use interactor::*;
pub use qrcodeutils::*;
pub use services::{PollHandle, StatusPoller, TransactionStatusService, WalletWatcher};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use utils::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
