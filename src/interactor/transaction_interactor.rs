use crate::chain::ShardeumClient;
use crate::entity::{Transaction, TransactionStatus};
use crate::services::{PollHandle, StatusPoller};
use crate::storage::AddressRepository;
use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, error, info, warn};
use std::sync::Arc;

#[async_trait]
pub trait TransactionInteractor: Send + Sync {
    /// Prepend to the wallet's history. A pending record also gets a
    /// background status poll, whose handle is returned.
    async fn store_transaction(
        &self,
        address: &str,
        transaction: Transaction,
    ) -> Result<Option<PollHandle>>;
    async fn update_transaction_status(
        &self,
        address: &str,
        hash: &str,
        status: TransactionStatus,
    ) -> Result<bool>;
    async fn get_transactions(&self, address: &str) -> Result<Vec<Transaction>>;
    async fn fetch_history(&self, address: &str) -> Result<Vec<Transaction>>;
    async fn refresh_pending(&self, address: &str) -> Result<usize>;
    async fn refresh_all_pending(&self) -> Result<usize>;
}

pub struct TransactionInteractorImpl {
    repository: Arc<AddressRepository<Transaction>>,
    client: Arc<ShardeumClient>,
    poller: Arc<StatusPoller>,
    history_block_window: u64,
}

impl TransactionInteractorImpl {
    pub fn new(
        repository: Arc<AddressRepository<Transaction>>,
        client: Arc<ShardeumClient>,
        poller: Arc<StatusPoller>,
        history_block_window: u64,
    ) -> Self {
        Self {
            repository,
            client,
            poller,
            history_block_window,
        }
    }
}

// Rewrite the status of every stored record carrying `hash`
async fn patch_status(
    repository: &AddressRepository<Transaction>,
    address: &str,
    hash: &str,
    status: TransactionStatus,
) -> Result<bool> {
    let found = repository
        .update(address, |transactions| {
            let mut found = false;
            for transaction in transactions.iter_mut().filter(|t| t.hash == hash) {
                transaction.status = status;
                found = true;
            }
            Ok(found)
        })
        .await?;

    if found {
        info!("Updated transaction status: {} to {}", hash, status);
    }

    Ok(found)
}

#[async_trait]
impl TransactionInteractor for TransactionInteractorImpl {
    async fn store_transaction(
        &self,
        address: &str,
        transaction: Transaction,
    ) -> Result<Option<PollHandle>> {
        let hash = transaction.hash.clone();
        let pending = transaction.status == TransactionStatus::Pending;

        self.repository.push_front(address, transaction).await?;
        info!("Stored transaction: {}", hash);

        if !pending {
            return Ok(None);
        }

        let repository = self.repository.clone();
        let owner = address.to_string();
        let tracked = hash.clone();
        let handle = self.poller.spawn(hash, move |status| async move {
            patch_status(&repository, &owner, &tracked, status)
                .await
                .map(|_| ())
        });

        Ok(Some(handle))
    }

    async fn update_transaction_status(
        &self,
        address: &str,
        hash: &str,
        status: TransactionStatus,
    ) -> Result<bool> {
        patch_status(&self.repository, address, hash, status).await
    }

    async fn get_transactions(&self, address: &str) -> Result<Vec<Transaction>> {
        self.repository.get(address).await
    }

    async fn fetch_history(&self, address: &str) -> Result<Vec<Transaction>> {
        debug!("Fetching transaction history for {}", address);

        match self.client.get_recent_logs(self.history_block_window).await {
            Ok(logs) => debug!("Found {} logs", logs.len()),
            Err(e) => {
                // Provider unreachable: serve what we have without refreshing
                warn!("Failed to fetch transaction history: {}", e);
                return self.repository.get(address).await;
            }
        }

        self.refresh_pending(address).await?;
        self.repository.get(address).await
    }

    async fn refresh_pending(&self, address: &str) -> Result<usize> {
        let pending: Vec<String> = self
            .repository
            .get(address)
            .await?
            .into_iter()
            .filter(|t| !t.status.is_terminal())
            .map(|t| t.hash)
            .collect();

        // Receipts are read concurrently; the record is rewritten one hash at a time.
        let receipts = join_all(
            pending
                .iter()
                .map(|hash| self.client.get_transaction_status(hash)),
        )
        .await;

        let mut updated = 0;
        for (hash, receipt) in pending.iter().zip(receipts) {
            if let Some(status) = receipt.terminal_status() {
                if patch_status(&self.repository, address, hash, status).await? {
                    updated += 1;
                }
            }
        }

        Ok(updated)
    }

    async fn refresh_all_pending(&self) -> Result<usize> {
        let mut updated = 0;

        for address in self.repository.addresses().await? {
            match self.refresh_pending(&address).await {
                Ok(count) => updated += count,
                Err(e) => error!("Failed to refresh pending transactions of {}: {}", address, e),
            }
        }

        Ok(updated)
    }
}
