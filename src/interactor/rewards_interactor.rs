use crate::entity::{PayLinkError, Redemption, RewardKind, RewardTransaction};
use crate::storage::{AddressRecord, AddressRepository};
use crate::utils::generate_id;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use rand::{rng, RngCore};
use std::sync::Arc;

/// RWD earned per SHM sent.
pub const REWARD_RATE: f64 = 10.0;

/// RWD needed for one SHM.
pub const CONVERSION_RATE: f64 = 100.0;

pub fn calculate_shm_amount(rwd_amount: f64) -> f64 {
    rwd_amount / CONVERSION_RATE
}

pub fn conversion_rate() -> f64 {
    CONVERSION_RATE
}

/// Smallest redeemable amount: one SHM worth of RWD.
pub fn minimum_redemption() -> f64 {
    CONVERSION_RATE
}

// Stand-in hash for an off-chain redemption
fn mock_transaction_hash() -> String {
    let mut bytes = [0u8; 32];
    rng().fill_bytes(&mut bytes);
    format!("0x{}", hex::encode(bytes))
}

/// Client-side RWD loyalty ledger.
#[async_trait]
pub trait RewardsInteractor: Send + Sync {
    async fn get_reward_balance(&self, address: &str) -> Result<f64>;
    async fn get_reward_history(&self, address: &str) -> Result<Vec<RewardTransaction>>;
    /// Credit `payment_amount * REWARD_RATE`. Returns `false` on invalid input.
    async fn mint_rewards_for_payment(
        &self,
        sender: &str,
        payment_amount: f64,
        transaction_hash: &str,
    ) -> Result<bool>;
    async fn redeem_rewards(&self, address: &str, rwd_amount: f64) -> Result<Redemption>;
    async fn can_redeem(&self, address: &str, rwd_amount: f64) -> Result<bool>;
}

pub struct RewardsInteractorImpl {
    balances: AddressRecord<f64>,
    history: AddressRepository<RewardTransaction>,
}

impl RewardsInteractorImpl {
    pub fn new(balances: AddressRecord<f64>, history: AddressRepository<RewardTransaction>) -> Self {
        Self { balances, history }
    }
}

#[async_trait]
impl RewardsInteractor for RewardsInteractorImpl {
    async fn get_reward_balance(&self, address: &str) -> Result<f64> {
        if address.is_empty() {
            debug!("No address provided for reward balance");
            return Ok(0.0);
        }

        let balance = self.balances.get(address).await?.unwrap_or(0.0);
        debug!("Reward balance for {}: {} RWD", address, balance);
        Ok(balance)
    }

    async fn get_reward_history(&self, address: &str) -> Result<Vec<RewardTransaction>> {
        self.history.get(address).await
    }

    async fn mint_rewards_for_payment(
        &self,
        sender: &str,
        payment_amount: f64,
        transaction_hash: &str,
    ) -> Result<bool> {
        if sender.is_empty() || !payment_amount.is_finite() || payment_amount <= 0.0 {
            debug!("Invalid parameters for reward minting");
            return Ok(false);
        }

        let reward_amount = payment_amount * REWARD_RATE;
        self.balances
            .update(sender, |current| Ok((current.unwrap_or(0.0) + reward_amount, ())))
            .await?;

        let entry = RewardTransaction {
            id: generate_id("reward"),
            kind: RewardKind::Earned,
            amount: reward_amount,
            payment_amount: Some(payment_amount),
            timestamp: Utc::now(),
            transaction_hash: Some(transaction_hash.to_string()),
        };
        self.history.push_front(sender, entry).await?;

        info!(
            "Rewards minted successfully: {} RWD for {} SHM payment",
            reward_amount, payment_amount
        );
        Ok(true)
    }

    async fn redeem_rewards(&self, address: &str, rwd_amount: f64) -> Result<Redemption> {
        if address.is_empty() || !rwd_amount.is_finite() || rwd_amount <= 0.0 {
            return Err(PayLinkError::Validation("Invalid parameters".to_string()).into());
        }

        self.balances
            .update(address, |current| {
                let current = current.unwrap_or(0.0);
                if current < rwd_amount {
                    return Err(PayLinkError::InsufficientRewardBalance.into());
                }
                Ok((current - rwd_amount, ()))
            })
            .await?;

        let shm_amount = calculate_shm_amount(rwd_amount);

        let transaction_hash = mock_transaction_hash();
        let entry = RewardTransaction {
            id: generate_id("redeem"),
            kind: RewardKind::Redeemed,
            amount: rwd_amount,
            payment_amount: None,
            timestamp: Utc::now(),
            transaction_hash: Some(transaction_hash.clone()),
        };
        self.history.push_front(address, entry).await?;

        info!(
            "Rewards redeemed successfully: {} RWD -> {} SHM",
            rwd_amount, shm_amount
        );

        Ok(Redemption {
            rwd_amount,
            shm_amount,
            transaction_hash,
        })
    }

    async fn can_redeem(&self, address: &str, rwd_amount: f64) -> Result<bool> {
        let balance = self.get_reward_balance(address).await?;
        Ok(rwd_amount > 0.0 && balance >= rwd_amount)
    }
}

/// Convenience constructor over a shared store.
pub fn rewards_interactor(store: Arc<dyn crate::storage::KeyValueStore>) -> RewardsInteractorImpl {
    use crate::storage::{MAX_REWARD_HISTORY, REWARDS_BALANCE_KEY, REWARDS_HISTORY_KEY};

    RewardsInteractorImpl::new(
        AddressRecord::new(store.clone(), REWARDS_BALANCE_KEY),
        AddressRepository::new(store, REWARDS_HISTORY_KEY, MAX_REWARD_HISTORY),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_helpers() {
        assert_eq!(calculate_shm_amount(250.0), 2.5);
        assert_eq!(conversion_rate(), 100.0);
        assert_eq!(minimum_redemption(), 100.0);
    }

    #[test]
    fn mock_hash_is_32_bytes_of_hex() {
        let hash = mock_transaction_hash();
        assert!(hash.starts_with("0x"));
        assert_eq!(hash.len(), 66);
    }
}
