use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WalletState {
    pub is_connected: bool,
    pub address: Option<String>,
    pub balance: f64,
    pub chain_id: Option<String>,
}

/// Provider notifications mirrored from `accountsChanged` / `chainChanged`.
#[derive(Debug, Clone, PartialEq)]
pub enum WalletEvent {
    AccountsChanged(Vec<String>),
    ChainChanged(String),
}
