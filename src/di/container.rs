use std::sync::Arc;

use crate::chain::{ShardeumClient, WalletProvider};
use crate::config::AppConfig;
use crate::interactor::auth_interactor::{AuthInteractor, AuthInteractorImpl};
use crate::interactor::password_interactor::{PasswordInteractor, PasswordInteractorImpl};
use crate::interactor::rewards_interactor::{self, RewardsInteractor};
use crate::interactor::send_interactor::{SendInteractor, SendInteractorImpl};
use crate::interactor::split_bill_interactor::{SplitBillInteractor, SplitBillInteractorImpl};
use crate::interactor::transaction_interactor::{TransactionInteractor, TransactionInteractorImpl};
use crate::interactor::wallet_interactor::{WalletInteractor, WalletInteractorImpl};
use crate::services::{StatusPoller, TransactionStatusService, WalletWatcher};
use crate::storage::{
    AddressRecord, AddressRepository, KeyValueStore, MAX_SPLIT_BILLS, MAX_TRANSACTIONS,
    PASSWORD_KEY, SPLIT_BILLS_KEY, TRANSACTIONS_KEY,
};

/// ServiceContainer provides access to core application dependencies
pub struct ServiceContainer {
    // Core services
    config: AppConfig,
    store: Arc<dyn KeyValueStore>,
    client: Arc<ShardeumClient>,
    poller: Arc<StatusPoller>,

    // Interactors
    transactions: Arc<dyn TransactionInteractor>,
    rewards: Arc<dyn RewardsInteractor>,
    send: Arc<dyn SendInteractor>,
    split_bills: Arc<dyn SplitBillInteractor>,
    passwords: Arc<dyn PasswordInteractor>,
    auth: Arc<dyn AuthInteractor>,
    wallet: Arc<dyn WalletInteractor>,
}

impl ServiceContainer {
    /// Wire every interactor over one store and one wallet provider
    pub fn new(
        config: AppConfig,
        store: Arc<dyn KeyValueStore>,
        provider: Arc<dyn WalletProvider>,
    ) -> Self {
        let client = Arc::new(ShardeumClient::new(provider, config.network.clone()));
        let poller = Arc::new(StatusPoller::new(
            client.clone(),
            config.polling.retry_policy(),
        ));

        let transactions = Arc::new(TransactionInteractorImpl::new(
            Arc::new(AddressRepository::new(
                store.clone(),
                TRANSACTIONS_KEY,
                MAX_TRANSACTIONS,
            )),
            client.clone(),
            poller.clone(),
            config.history_block_window,
        )) as Arc<dyn TransactionInteractor>;

        let rewards = Arc::new(rewards_interactor::rewards_interactor(store.clone()))
            as Arc<dyn RewardsInteractor>;

        let send = Arc::new(SendInteractorImpl::new(
            client.clone(),
            transactions.clone(),
            rewards.clone(),
        )) as Arc<dyn SendInteractor>;

        let split_bills = Arc::new(SplitBillInteractorImpl::new(
            AddressRepository::new(store.clone(), SPLIT_BILLS_KEY, MAX_SPLIT_BILLS),
            client.clone(),
            rewards.clone(),
            config.split_bill.payment_delay(),
        )) as Arc<dyn SplitBillInteractor>;

        let passwords = Arc::new(PasswordInteractorImpl::new(AddressRecord::new(
            store.clone(),
            PASSWORD_KEY,
        ))) as Arc<dyn PasswordInteractor>;

        let auth = Arc::new(AuthInteractorImpl::new(store.clone())) as Arc<dyn AuthInteractor>;
        let wallet = Arc::new(WalletInteractorImpl::new(client.clone())) as Arc<dyn WalletInteractor>;

        Self {
            config,
            store,
            client,
            poller,
            transactions,
            rewards,
            send,
            split_bills,
            passwords,
            auth,
            wallet,
        }
    }

    pub fn transaction_status_service(&self) -> TransactionStatusService {
        TransactionStatusService::new(self.transactions.clone(), self.config.sweep.interval())
    }

    pub fn wallet_watcher(&self) -> WalletWatcher {
        WalletWatcher::new(self.client.clone(), self.config.watcher.interval())
    }

    // Accessor methods

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        self.store.clone()
    }

    pub fn client(&self) -> Arc<ShardeumClient> {
        self.client.clone()
    }

    pub fn poller(&self) -> Arc<StatusPoller> {
        self.poller.clone()
    }

    pub fn transactions(&self) -> Arc<dyn TransactionInteractor> {
        self.transactions.clone()
    }

    pub fn rewards(&self) -> Arc<dyn RewardsInteractor> {
        self.rewards.clone()
    }

    pub fn send(&self) -> Arc<dyn SendInteractor> {
        self.send.clone()
    }

    pub fn split_bills(&self) -> Arc<dyn SplitBillInteractor> {
        self.split_bills.clone()
    }

    pub fn passwords(&self) -> Arc<dyn PasswordInteractor> {
        self.passwords.clone()
    }

    pub fn auth(&self) -> Arc<dyn AuthInteractor> {
        self.auth.clone()
    }

    pub fn wallet(&self) -> Arc<dyn WalletInteractor> {
        self.wallet.clone()
    }
}
