use crate::chain::config::NetworkConfig;
use crate::chain::provider::WalletProvider;
use crate::chain::utils::{parse_hex_quantity, shm_to_wei, to_hex_quantity, wei_to_shm};
use crate::entity::{PayLinkError, TransactionStatus};
use crate::utils::validate_address;
use anyhow::{anyhow, Result};
use log::{error, info, warn};
use serde_json::{json, Value};
use std::sync::Arc;

/// Gas limit of a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Gas price assumed when the network cannot be asked.
pub const FALLBACK_GAS_PRICE: &str = "0x9184e72a000";

pub const MIN_DISPLAY_FEE: f64 = 0.0001;

const NO_ACCOUNT_FEE: f64 = 0.001;

/// Receipt lookup result for a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    Pending,
    Completed,
    Failed,
    /// The lookup itself failed; the transaction may still be pending.
    Unknown,
}

impl ReceiptStatus {
    pub fn terminal_status(&self) -> Option<TransactionStatus> {
        match self {
            ReceiptStatus::Completed => Some(TransactionStatus::Completed),
            ReceiptStatus::Failed => Some(TransactionStatus::Failed),
            ReceiptStatus::Pending | ReceiptStatus::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GasEstimate {
    pub gas_limit: u64,
    pub gas_price: String,
    pub estimated_fee: f64,
}

impl GasEstimate {
    fn fallback(estimated_fee: f64) -> Self {
        Self {
            gas_limit: TRANSFER_GAS_LIMIT,
            gas_price: FALLBACK_GAS_PRICE.to_string(),
            estimated_fee,
        }
    }
}

/// Shardeum network client over a wallet provider
pub struct ShardeumClient {
    provider: Arc<dyn WalletProvider>,
    network: NetworkConfig,
}

impl ShardeumClient {
    pub fn new(provider: Arc<dyn WalletProvider>, network: NetworkConfig) -> Self {
        Self { provider, network }
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        Ok(self.provider.request(method, params).await?)
    }

    async fn call_str(&self, method: &str, params: Value) -> Result<String> {
        let value = self.call(method, params).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| PayLinkError::UnexpectedResponse(format!("{}: {}", method, value)).into())
    }

    /// Ask the wallet to expose its accounts (may prompt the user)
    pub async fn request_accounts(&self) -> Result<Vec<String>> {
        let value = self.call("eth_requestAccounts", json!([])).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Accounts already exposed to us, without prompting
    pub async fn accounts(&self) -> Result<Vec<String>> {
        let value = self.call("eth_accounts", json!([])).await?;
        if value.is_null() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(value)?)
    }

    pub async fn chain_id(&self) -> Result<String> {
        self.call_str("eth_chainId", json!([])).await
    }

    pub async fn block_number(&self) -> Result<u64> {
        let raw = self.call_str("eth_blockNumber", json!([])).await?;
        Ok(parse_hex_quantity(&raw)? as u64)
    }

    /// Get SHM balance
    pub async fn get_balance(&self, address: &str) -> Result<f64> {
        let raw = self
            .call_str("eth_getBalance", json!([address, "latest"]))
            .await
            .map_err(|e| anyhow!("Failed to get balance: {}", e))?;

        // Convert from wei to SHM
        Ok(wei_to_shm(parse_hex_quantity(&raw)?))
    }

    pub async fn gas_price(&self) -> Result<String> {
        self.call_str("eth_gasPrice", json!([])).await
    }

    /// Send SHM from the first connected account. Returns the transaction hash
    /// as soon as the wallet accepts it, without waiting for a receipt.
    pub async fn send_transaction(&self, to: &str, amount: f64) -> Result<String> {
        if !validate_address(to) {
            return Err(PayLinkError::InvalidAddress.into());
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(PayLinkError::InvalidAmount.into());
        }

        let accounts = self.accounts().await?;
        let from = accounts.first().ok_or(PayLinkError::WalletNotConnected)?;

        let value = to_hex_quantity(shm_to_wei(amount)?);
        let gas_price = self.gas_price().await?;

        info!(
            "Sending transaction: from {} to {} value {} gasPrice {}",
            from, to, value, gas_price
        );

        let hash = self
            .call_str(
                "eth_sendTransaction",
                json!([{
                    "from": from,
                    "to": to,
                    "value": value,
                    "gas": to_hex_quantity(TRANSFER_GAS_LIMIT as u128),
                    "gasPrice": gas_price,
                }]),
            )
            .await?;

        info!("Transaction sent: {}", hash);
        Ok(hash)
    }

    /// Estimate the fee of a transfer. Never fails: falls back to network defaults.
    pub async fn estimate_gas(&self, to: &str, amount: f64) -> GasEstimate {
        let from = match self.accounts().await {
            Ok(accounts) if !accounts.is_empty() => accounts[0].clone(),
            _ => return GasEstimate::fallback(NO_ACCOUNT_FEE),
        };

        match self.try_estimate_gas(&from, to, amount).await {
            Ok(estimate) => estimate,
            Err(e) => {
                warn!("Failed to estimate gas: {}", e);
                GasEstimate::fallback(MIN_DISPLAY_FEE)
            }
        }
    }

    async fn try_estimate_gas(&self, from: &str, to: &str, amount: f64) -> Result<GasEstimate> {
        let value = to_hex_quantity(shm_to_wei(amount)?);
        let gas_price = self.gas_price().await?;
        let gas_limit = self
            .call_str(
                "eth_estimateGas",
                json!([{ "from": from, "to": to, "value": value }]),
            )
            .await?;

        let price_wei = parse_hex_quantity(&gas_price)?;
        let limit = parse_hex_quantity(&gas_limit)?;
        let fee = wei_to_shm(price_wei.saturating_mul(limit));

        Ok(GasEstimate {
            gas_limit: limit as u64,
            gas_price,
            estimated_fee: fee.max(MIN_DISPLAY_FEE),
        })
    }

    pub async fn get_transaction_status(&self, hash: &str) -> ReceiptStatus {
        match self.call("eth_getTransactionReceipt", json!([hash])).await {
            Ok(Value::Null) => ReceiptStatus::Pending,
            Ok(receipt) => {
                if receipt.get("status").and_then(Value::as_str) == Some("0x1") {
                    ReceiptStatus::Completed
                } else {
                    ReceiptStatus::Failed
                }
            }
            Err(e) => {
                error!("Failed to get transaction status for {}: {}", hash, e);
                ReceiptStatus::Unknown
            }
        }
    }

    /// Logs emitted over the last `window` blocks
    pub async fn get_recent_logs(&self, window: u64) -> Result<Vec<Value>> {
        let latest = self.block_number().await?;
        let from_block = latest.saturating_sub(window);

        let logs = self
            .call(
                "eth_getLogs",
                json!([{
                    "fromBlock": to_hex_quantity(from_block as u128),
                    "toBlock": "latest",
                }]),
            )
            .await?;

        match logs {
            Value::Null => Ok(Vec::new()),
            Value::Array(entries) => Ok(entries),
            other => Err(PayLinkError::UnexpectedResponse(format!("eth_getLogs: {}", other)).into()),
        }
    }

    pub async fn switch_network(&self) -> Result<()> {
        self.call(
            "wallet_switchEthereumChain",
            json!([{ "chainId": self.network.chain_id }]),
        )
        .await?;
        Ok(())
    }

    pub async fn add_network(&self) -> Result<()> {
        self.call("wallet_addEthereumChain", json!([self.network.add_chain_params()]))
            .await?;
        Ok(())
    }
}
