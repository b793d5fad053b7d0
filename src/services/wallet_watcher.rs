use crate::chain::ShardeumClient;
use crate::entity::WalletEvent;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;

/// Last observed provider state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalletSnapshot {
    pub accounts: Option<Vec<String>>,
    pub chain_id: Option<String>,
}

/// Turns periodic `eth_accounts` / `eth_chainId` reads into change events.
pub struct WalletWatcher {
    client: Arc<ShardeumClient>,
    period: Duration,
    events: broadcast::Sender<WalletEvent>,
    stop_tx: Option<mpsc::Sender<()>>,
}

impl WalletWatcher {
    pub fn new(client: Arc<ShardeumClient>, period: Duration) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            client,
            // `interval` panics on a zero period
            period: period.max(Duration::from_millis(1)),
            events,
            stop_tx: None,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }

    /// Read the provider once and report what changed since `snapshot`.
    /// The first observation of each field only sets the baseline.
    pub async fn observe(client: &ShardeumClient, snapshot: &mut WalletSnapshot) -> Vec<WalletEvent> {
        let mut changes = Vec::new();

        match client.accounts().await {
            Ok(accounts) => {
                if let Some(previous) = &snapshot.accounts {
                    if *previous != accounts {
                        changes.push(WalletEvent::AccountsChanged(accounts.clone()));
                    }
                }
                snapshot.accounts = Some(accounts);
            }
            Err(e) => debug!("Could not read accounts: {}", e),
        }

        match client.chain_id().await {
            Ok(chain_id) => {
                if let Some(previous) = &snapshot.chain_id {
                    if !previous.eq_ignore_ascii_case(&chain_id) {
                        changes.push(WalletEvent::ChainChanged(chain_id.clone()));
                    }
                }
                snapshot.chain_id = Some(chain_id);
            }
            Err(e) => debug!("Could not read chain id: {}", e),
        }

        changes
    }

    pub async fn start(&mut self) {
        if self.stop_tx.is_some() {
            warn!("Wallet watcher is already running");
            return;
        }

        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
        self.stop_tx = Some(stop_tx);

        let client = self.client.clone();
        let events = self.events.clone();
        let period = self.period;

        tokio::spawn(async move {
            let mut ticker = interval(period);
            let mut snapshot = WalletSnapshot::default();

            loop {
                select! {
                    _ = ticker.tick() => {
                        for event in Self::observe(&client, &mut snapshot).await {
                            info!("Wallet event: {:?}", event);
                            // No subscribers is fine
                            let _ = events.send(event);
                        }
                    }
                    _ = stop_rx.recv() => {
                        info!("Stopping wallet watcher");
                        break;
                    }
                }
            }
        });

        info!("Wallet watcher started");
    }

    pub async fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(()).await;
        }
    }
}
