use crate::chain::NetworkConfig;
use crate::services::retry::RetryPolicy;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_ms: u64,
    pub max_attempts: u32,
    pub deadline_ms: Option<u64>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2_000,
            max_attempts: 30,
            deadline_ms: None,
        }
    }
}

impl PollingConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            interval: Duration::from_millis(self.interval_ms),
            max_attempts: self.max_attempts,
            deadline: self.deadline_ms.map(Duration::from_millis),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SplitBillConfig {
    /// Pause after each successful participant payment.
    pub payment_delay_ms: u64,
}

impl Default for SplitBillConfig {
    fn default() -> Self {
        Self {
            payment_delay_ms: 1_000,
        }
    }
}

impl SplitBillConfig {
    pub fn payment_delay(&self) -> Duration {
        Duration::from_millis(self.payment_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct IntervalConfig {
    pub interval_ms: u64,
}

impl IntervalConfig {
    /// Loop period; never zero.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self { interval_ms: 15_000 }
    }
}

/// Application configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub database_url: String,
    pub network: NetworkConfig,
    pub polling: PollingConfig,
    pub split_bill: SplitBillConfig,
    /// Wallet account/chain change detection.
    pub watcher: IntervalConfig,
    /// Periodic re-check of stored pending transactions.
    pub sweep: IntervalConfig,
    /// Blocks scanned by `eth_getLogs` when history is fetched.
    pub history_block_window: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://paylink.db".to_string(),
            network: NetworkConfig::default(),
            polling: PollingConfig::default(),
            split_bill: SplitBillConfig::default(),
            watcher: IntervalConfig { interval_ms: 4_000 },
            sweep: IntervalConfig::default(),
            history_block_window: 1_000,
        }
    }
}

impl AppConfig {
    /// Load configuration from `PAYLINK_*` environment variables.
    /// Nested keys use `__`, e.g. `PAYLINK_NETWORK__RPC_URL`.
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("PAYLINK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        settings
            .try_deserialize::<AppConfig>()
            .context("Invalid configuration")
    }
}
