use crate::chain::{GasEstimate, ShardeumClient};
use crate::entity::{PayLinkError, PaymentRequest, QrPaymentData, Transaction};
use crate::interactor::rewards_interactor::RewardsInteractor;
use crate::interactor::transaction_interactor::TransactionInteractor;
use crate::services::{best_effort, PollHandle};
use crate::utils::{self, validate_address};
use anyhow::Result;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

#[derive(Debug)]
pub struct SendResult {
    pub transaction: Transaction,
    /// Explorer page of the submitted transaction.
    pub explorer_url: String,
    pub rewards_minted: bool,
    /// Background status poll of the new record, if it could be stored.
    pub status_poll: Option<PollHandle>,
}

#[async_trait]
pub trait SendInteractor: Send + Sync {
    /// Check the send form. Returns the parsed amount.
    async fn validate_send(
        &self,
        recipient: &str,
        amount_text: &str,
        balance: f64,
        estimated_fee: f64,
    ) -> Result<f64>;
    async fn estimate_fee(&self, recipient: &str, amount: f64) -> GasEstimate;
    async fn send_payment(&self, sender: &str, request: &PaymentRequest) -> Result<SendResult>;
    /// Pay a scanned QR request, checking the amount against the live balance.
    async fn pay_scanned(
        &self,
        sender: &str,
        scanned: &QrPaymentData,
        amount: f64,
        note: Option<String>,
    ) -> Result<SendResult>;
}

pub struct SendInteractorImpl {
    client: Arc<ShardeumClient>,
    transactions: Arc<dyn TransactionInteractor>,
    rewards: Arc<dyn RewardsInteractor>,
}

impl SendInteractorImpl {
    pub fn new(
        client: Arc<ShardeumClient>,
        transactions: Arc<dyn TransactionInteractor>,
        rewards: Arc<dyn RewardsInteractor>,
    ) -> Self {
        Self {
            client,
            transactions,
            rewards,
        }
    }
}

fn invalid(message: impl Into<String>) -> anyhow::Error {
    PayLinkError::Validation(message.into()).into()
}

#[async_trait]
impl SendInteractor for SendInteractorImpl {
    async fn validate_send(
        &self,
        recipient: &str,
        amount_text: &str,
        balance: f64,
        estimated_fee: f64,
    ) -> Result<f64> {
        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Err(invalid("Recipient address is required"));
        }
        if !validate_address(recipient) {
            return Err(invalid("Invalid recipient address format"));
        }
        if amount_text.trim().is_empty() {
            return Err(invalid("Amount is required"));
        }

        let amount = match utils::parse_amount(amount_text) {
            Some(amount) if amount > 0.0 => amount,
            _ => return Err(invalid("Amount must be a positive number")),
        };

        if amount > balance {
            return Err(invalid("Insufficient balance"));
        }
        if amount + estimated_fee > balance {
            return Err(invalid(format!(
                "Insufficient balance for transaction + gas fees ({:.6} SHM)",
                estimated_fee
            )));
        }

        Ok(amount)
    }

    async fn estimate_fee(&self, recipient: &str, amount: f64) -> GasEstimate {
        self.client.estimate_gas(recipient, amount).await
    }

    async fn send_payment(&self, sender: &str, request: &PaymentRequest) -> Result<SendResult> {
        if sender.is_empty() {
            return Err(PayLinkError::WalletNotConnected.into());
        }

        info!("Initiating transaction: {} SHM to {}", request.amount, request.to);
        let hash = self
            .client
            .send_transaction(&request.to, request.amount)
            .await?;

        let transaction =
            Transaction::pending_send(sender, &request.to, request.amount, &hash, request.note.clone());

        let status_poll = best_effort(
            "Storing transaction",
            self.transactions
                .store_transaction(sender, transaction.clone()),
        )
        .await
        .flatten();

        // The payment already went out; a reward failure must not undo it.
        let rewards_minted = best_effort(
            "Minting rewards",
            self.rewards
                .mint_rewards_for_payment(sender, request.amount, &hash),
        )
        .await
        .unwrap_or(false);

        let explorer_url = self.client.network().transaction_url(&hash);
        info!("Transaction submitted: {}", explorer_url);

        Ok(SendResult {
            transaction,
            explorer_url,
            rewards_minted,
            status_poll,
        })
    }

    async fn pay_scanned(
        &self,
        sender: &str,
        scanned: &QrPaymentData,
        amount: f64,
        note: Option<String>,
    ) -> Result<SendResult> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(PayLinkError::InvalidAmount.into());
        }

        let balance = self.client.get_balance(sender).await?;
        if amount > balance {
            return Err(PayLinkError::InsufficientFunds.into());
        }

        let request = PaymentRequest {
            to: scanned.address.clone(),
            amount,
            note: note.or_else(|| scanned.note.clone()),
        };
        self.send_payment(sender, &request).await
    }
}
