use crate::entity::PayLinkError;
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// EIP-1193 style request interface of an injected wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, PayLinkError>;
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

/// JSON-RPC 2.0 provider talking to a node over HTTP
pub struct HttpProvider {
    http_client: Client,
    rpc_url: String,
    next_id: AtomicU64,
}

impl HttpProvider {
    pub fn new(rpc_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            rpc_url: rpc_url.to_string(),
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl WalletProvider for HttpProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, PayLinkError> {
        // A node has no account prompt; the unlocked accounts are the connected ones.
        let method = match method {
            "eth_requestAccounts" => "eth_accounts",
            other => other,
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!("RPC request #{} {}", id, method);

        let response = self.http_client.post(&self.rpc_url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("RPC error [{}]: {} {}", method, status, error_text);
            return Err(PayLinkError::Provider {
                code: i64::from(status.as_u16()),
                message: error_text,
            });
        }

        let rpc_response: RpcResponse = response.json().await?;

        if let Some(err) = rpc_response.error {
            debug!("RPC #{} {} failed: {} {}", id, method, err.code, err.message);
            return Err(PayLinkError::from_rpc(err.code, err.message));
        }

        Ok(rpc_response.result.unwrap_or(Value::Null))
    }
}

/// Create an HTTP provider for the given RPC endpoint
pub fn create_http_provider(rpc_url: &str) -> Arc<dyn WalletProvider> {
    Arc::new(HttpProvider::new(rpc_url))
}
