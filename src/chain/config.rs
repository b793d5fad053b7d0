use serde::Deserialize;
use serde_json::{json, Value};

/// Parameters of the target chain, as handed to `wallet_addEthereumChain`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    pub chain_id: String,
    pub chain_name: String,
    pub rpc_url: String,
    pub explorer_url: String,
    pub currency_name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: "0x1F90".to_string(), // 8080
            chain_name: "Shardeum Unstablenet".to_string(),
            rpc_url: "https://api-unstable.shardeum.org".to_string(),
            explorer_url: "https://explorer-unstable.shardeum.org".to_string(),
            currency_name: "Shardeum".to_string(),
            symbol: "SHM".to_string(),
            decimals: 18,
        }
    }
}

impl NetworkConfig {
    /// Chain ids are compared case-insensitively (`0x1F90` == `0x1f90`).
    pub fn matches_chain(&self, chain_id: &str) -> bool {
        self.chain_id.eq_ignore_ascii_case(chain_id)
    }

    pub fn chain_id_decimal(&self) -> Option<u64> {
        let digits = self.chain_id.trim_start_matches("0x").trim_start_matches("0X");
        u64::from_str_radix(digits, 16).ok()
    }

    pub fn add_chain_params(&self) -> Value {
        json!({
            "chainId": self.chain_id,
            "chainName": self.chain_name,
            "nativeCurrency": {
                "name": self.currency_name,
                "symbol": self.symbol,
                "decimals": self.decimals,
            },
            "rpcUrls": [self.rpc_url],
            "blockExplorerUrls": [self.explorer_url],
        })
    }

    pub fn transaction_url(&self, hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_shardeum_unstablenet() {
        let config = NetworkConfig::default();
        assert_eq!(config.chain_id_decimal(), Some(8080));
        assert!(config.matches_chain("0x1f90"));
        assert!(!config.matches_chain("0x1"));
        assert_eq!(config.add_chain_params()["nativeCurrency"]["symbol"], "SHM");
    }
}
