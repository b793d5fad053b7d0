use crate::chain::ShardeumClient;
use crate::entity::{PayLinkError, WalletEvent, WalletState};
use crate::services::best_effort;
use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;

#[async_trait]
pub trait WalletInteractor: Send + Sync {
    /// Prompt for accounts and make sure the wallet sits on the Shardeum network.
    async fn connect(&self) -> Result<WalletState>;
    /// Rebuild state from already-exposed accounts, without prompting.
    async fn check_connection(&self) -> Result<WalletState>;
    async fn refresh_balance(&self, state: &WalletState) -> Result<WalletState>;
    fn disconnect(&self) -> WalletState;
    fn is_on_shardeum(&self, state: &WalletState) -> bool;
    async fn apply_event(&self, state: &WalletState, event: &WalletEvent) -> Result<WalletState>;
}

pub struct WalletInteractorImpl {
    client: Arc<ShardeumClient>,
}

impl WalletInteractorImpl {
    pub fn new(client: Arc<ShardeumClient>) -> Self {
        Self { client }
    }

    // Switch to Shardeum, adding the network when the wallet does not know it
    async fn ensure_network(&self) -> Result<String> {
        if let Err(e) = self.client.switch_network().await {
            warn!("Failed to switch to Shardeum network: {}", e);
            if let Err(e) = self.client.add_network().await {
                warn!("Failed to add Shardeum network: {}", e);
            }
        }

        self.client.chain_id().await
    }

    async fn state_for(&self, address: &str, chain_id: String) -> WalletState {
        let balance = best_effort("Fetching balance", self.client.get_balance(address))
            .await
            .unwrap_or(0.0);

        WalletState {
            is_connected: true,
            address: Some(address.to_string()),
            balance,
            chain_id: Some(chain_id),
        }
    }
}

#[async_trait]
impl WalletInteractor for WalletInteractorImpl {
    async fn connect(&self) -> Result<WalletState> {
        let accounts = self.client.request_accounts().await?;
        let address = accounts
            .first()
            .cloned()
            .ok_or(PayLinkError::WalletNotConnected)?;

        let mut chain_id = self.client.chain_id().await?;
        info!("Connected {} with chainId {}", address, chain_id);

        if !self.client.network().matches_chain(&chain_id) {
            chain_id = self.ensure_network().await?;
        }

        Ok(self.state_for(&address, chain_id).await)
    }

    async fn check_connection(&self) -> Result<WalletState> {
        let accounts = self.client.accounts().await?;
        let address = match accounts.first() {
            Some(address) => address.clone(),
            None => return Ok(WalletState::default()),
        };

        let chain_id = self.client.chain_id().await?;
        Ok(self.state_for(&address, chain_id).await)
    }

    async fn refresh_balance(&self, state: &WalletState) -> Result<WalletState> {
        let address = state
            .address
            .as_deref()
            .ok_or(PayLinkError::WalletNotConnected)?;

        let balance = self.client.get_balance(address).await?;
        Ok(WalletState {
            balance,
            ..state.clone()
        })
    }

    fn disconnect(&self) -> WalletState {
        WalletState::default()
    }

    fn is_on_shardeum(&self, state: &WalletState) -> bool {
        state
            .chain_id
            .as_deref()
            .map(|id| self.client.network().matches_chain(id))
            .unwrap_or(false)
    }

    async fn apply_event(&self, state: &WalletState, event: &WalletEvent) -> Result<WalletState> {
        match event {
            WalletEvent::AccountsChanged(accounts) => match accounts.first() {
                None => Ok(self.disconnect()),
                Some(address) => {
                    let chain_id = match &state.chain_id {
                        Some(id) => id.clone(),
                        None => self.client.chain_id().await?,
                    };
                    Ok(self.state_for(address, chain_id).await)
                }
            },
            WalletEvent::ChainChanged(chain_id) => {
                info!("Chain changed to: {}", chain_id);
                let mut next = self.check_connection().await?;
                if next.is_connected {
                    next.chain_id = Some(chain_id.clone());
                }
                Ok(next)
            }
        }
    }
}
