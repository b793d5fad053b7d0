#![allow(dead_code)]

use async_trait::async_trait;
use paylink::chain::to_hex_quantity;
use paylink::config::AppConfig;
use paylink::{KeyValueStore, MemoryStore, PayLinkError, ServiceContainer, WalletProvider};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const SENDER: &str = "0x1111111111111111111111111111111111111111";
pub const ALICE: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const BOB: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
pub const CAROL: &str = "0xcccccccccccccccccccccccccccccccccccccccc";

pub const SHARDEUM_CHAIN_ID: &str = "0x1f90";

pub fn wei_hex(shm: u128) -> String {
    to_hex_quantity(shm * 1_000_000_000_000_000_000)
}

/// In-process wallet answering from a table of canned results.
pub struct ScriptedProvider {
    responses: Mutex<HashMap<String, Value>>,
    failing_methods: Mutex<HashMap<String, (i64, String)>>,
    failing_recipients: Mutex<HashSet<String>>,
    calls: Mutex<Vec<(String, Value)>>,
    sent: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Arc<Self> {
        let responses = HashMap::from([
            ("eth_accounts".to_string(), json!([SENDER])),
            ("eth_requestAccounts".to_string(), json!([SENDER])),
            ("eth_chainId".to_string(), json!(SHARDEUM_CHAIN_ID)),
            ("eth_getBalance".to_string(), json!(wei_hex(1_000))),
            ("eth_gasPrice".to_string(), json!("0x9184e72a000")),
            ("eth_estimateGas".to_string(), json!("0x5208")),
            ("eth_blockNumber".to_string(), json!("0x64")),
            ("eth_getLogs".to_string(), json!([])),
            ("eth_getTransactionReceipt".to_string(), json!({ "status": "0x1" })),
        ]);

        Arc::new(Self {
            responses: Mutex::new(responses),
            failing_methods: Mutex::new(HashMap::new()),
            failing_recipients: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            sent: AtomicUsize::new(0),
        })
    }

    pub fn respond(&self, method: &str, value: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(method.to_string(), value);
    }

    pub fn fail_method(&self, method: &str, code: i64, message: &str) {
        self.failing_methods
            .lock()
            .unwrap()
            .insert(method.to_string(), (code, message.to_string()));
    }

    pub fn reject_payments_to(&self, address: &str) {
        self.failing_recipients
            .lock()
            .unwrap()
            .insert(address.to_lowercase());
    }

    pub fn calls(&self, method: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(m, _)| m.clone())
            .collect()
    }
}

#[async_trait]
impl WalletProvider for ScriptedProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, PayLinkError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params.clone()));

        if let Some((code, message)) = self.failing_methods.lock().unwrap().get(method) {
            return Err(PayLinkError::from_rpc(*code, message.clone()));
        }

        match method {
            "eth_sendTransaction" => {
                let to = params[0]["to"].as_str().unwrap_or_default().to_lowercase();
                if self.failing_recipients.lock().unwrap().contains(&to) {
                    return Err(PayLinkError::Provider {
                        code: -32000,
                        message: "transfer rejected".to_string(),
                    });
                }
                let n = self.sent.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(json!(format!("0x{:064x}", n)))
            }
            // A wallet that accepts the chain makes it the active one.
            "wallet_switchEthereumChain" | "wallet_addEthereumChain" => {
                let chain_id = params[0]["chainId"].clone();
                self.respond("eth_chainId", chain_id);
                Ok(Value::Null)
            }
            _ => Ok(self
                .responses
                .lock()
                .unwrap()
                .get(method)
                .cloned()
                .unwrap_or(Value::Null)),
        }
    }
}

/// Defaults with every wait shortened to a millisecond.
pub fn fast_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.polling.interval_ms = 1;
    config.polling.max_attempts = 5;
    config.split_bill.payment_delay_ms = 1;
    config
}

pub fn container(provider: Arc<ScriptedProvider>) -> ServiceContainer {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    ServiceContainer::new(fast_config(), store, provider)
}

pub fn domain_error(err: &anyhow::Error) -> &PayLinkError {
    err.downcast_ref::<PayLinkError>()
        .expect("expected a PayLinkError")
}
