// Re-export everything from submodules
pub mod client;
pub mod config;
pub mod provider;
pub mod utils;

// Re-export commonly used items
pub use client::{GasEstimate, ReceiptStatus, ShardeumClient};
pub use config::NetworkConfig;
pub use provider::{create_http_provider, HttpProvider, WalletProvider};
pub use utils::{parse_hex_quantity, shm_to_wei, to_hex_quantity, wei_to_shm};
