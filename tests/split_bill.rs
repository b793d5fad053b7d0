mod common;

use async_trait::async_trait;
use common::*;
use paylink::interactor::split_bill_interactor::{SplitBillDraft, SplitBillInteractor, SplitBillInteractorImpl};
use paylink::storage::{AddressRepository, MAX_SPLIT_BILLS, SPLIT_BILLS_KEY};
use paylink::{
    MemoryStore, PayLinkError, Redemption, RewardTransaction, RewardsInteractor, ShardeumClient,
    SplitBillParticipant, SplitBillStatus, SplitMethod,
};
use std::sync::Arc;
use std::time::Duration;

fn draft(title: &str, total: f64, participants: &[(&str, &str, f64)]) -> SplitBillDraft {
    SplitBillDraft {
        title: title.to_string(),
        description: None,
        total_amount: total,
        participants: participants
            .iter()
            .map(|(name, address, amount)| SplitBillParticipant::new(name, address, *amount))
            .collect(),
        split_method: SplitMethod::Custom,
    }
}

fn dinner() -> SplitBillDraft {
    draft(
        "Dinner",
        30.0,
        &[("Alice", ALICE, 10.0), ("Bob", BOB, 10.0), ("Carol", CAROL, 10.0)],
    )
}

#[tokio::test]
async fn one_failed_payment_fails_the_bill_but_keeps_the_others() {
    let provider = ScriptedProvider::new();
    provider.reject_payments_to(CAROL);
    let services = container(provider.clone());

    let outcome = services
        .split_bills()
        .process_split_bill(SENDER, dinner())
        .await
        .unwrap();

    assert_eq!(outcome.paid_count(), 2);
    assert_eq!(outcome.bill.status, SplitBillStatus::Failed);
    assert!(outcome.bill.completed_at.is_none());
    assert_eq!(outcome.failed_payments.len(), 1);
    assert_eq!(outcome.failed_payments[0].name, "Carol");
    assert!(outcome.failed_payments[0].error.contains("transfer rejected"));
    assert_eq!(outcome.error_message().as_deref(), Some("Some payments failed: Carol"));

    let carol = &outcome.bill.participants[2];
    assert!(!carol.is_paid);
    assert!(carol.transaction_hash.is_none());
    assert!(outcome.bill.participants[..2]
        .iter()
        .all(|p| p.is_paid && p.transaction_hash.is_some()));

    // Payments go out in order, one per participant
    let sent = provider.calls("eth_sendTransaction");
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0][0]["to"], ALICE);
    assert_eq!(sent[2][0]["to"], CAROL);

    let stored = services.split_bills().get_split_bills(SENDER).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], outcome.bill);

    // Only the two successful payments earn rewards
    let balance = services.rewards().get_reward_balance(SENDER).await.unwrap();
    assert_eq!(balance, 200.0);
}

#[tokio::test]
async fn all_payments_succeeding_completes_the_bill() {
    let services = container(ScriptedProvider::new());

    let outcome = services
        .split_bills()
        .process_split_bill(SENDER, dinner())
        .await
        .unwrap();

    assert_eq!(outcome.bill.status, SplitBillStatus::Completed);
    assert!(outcome.bill.completed_at.is_some());
    assert!(outcome.failed_payments.is_empty());
    assert_eq!(outcome.error_message(), None);

    let stats = services.split_bills().get_split_bill_stats(SENDER).await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.total_participants, 3);
    assert_eq!(services.split_bills().get_success_rate(SENDER).await.unwrap(), 100);

    let history = services.rewards().get_reward_history(SENDER).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(services.rewards().get_reward_balance(SENDER).await.unwrap(), 300.0);
}

#[tokio::test]
async fn mismatched_split_is_rejected_before_anything_is_sent() {
    let provider = ScriptedProvider::new();
    let services = container(provider.clone());

    let err = services
        .split_bills()
        .process_split_bill(SENDER, draft("Groceries", 100.0, &[("Alice", ALICE, 50.0), ("Bob", BOB, 60.0)]))
        .await
        .unwrap_err();

    match domain_error(&err) {
        PayLinkError::Validation(message) => {
            assert_eq!(message, "Split amounts (110.0000 SHM) don't match total (100 SHM)")
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(provider.calls("eth_sendTransaction").is_empty());
    assert!(services.split_bills().get_split_bills(SENDER).await.unwrap().is_empty());
}

#[tokio::test]
async fn insufficient_balance_is_reported_with_both_amounts() {
    let provider = ScriptedProvider::new();
    provider.respond("eth_getBalance", serde_json::json!(wei_hex(1)));
    let services = container(provider.clone());

    let err = services
        .split_bills()
        .process_split_bill(SENDER, dinner())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Insufficient balance. Need 30.0000 SHM, have 1.0000 SHM");
    assert!(provider.calls("eth_sendTransaction").is_empty());
}

#[tokio::test]
async fn status_updates_and_clearing() {
    let services = container(ScriptedProvider::new());
    let split_bills = services.split_bills();

    let outcome = split_bills.process_split_bill(SENDER, dinner()).await.unwrap();

    let missing = split_bills
        .update_split_bill_status(SENDER, "split_missing", SplitBillStatus::Failed, None)
        .await
        .unwrap_err();
    assert!(matches!(domain_error(&missing), PayLinkError::SplitBillNotFound(_)));

    let updated = split_bills
        .update_split_bill_status(SENDER, &outcome.bill.id, SplitBillStatus::Failed, None)
        .await
        .unwrap();
    assert_eq!(updated.status, SplitBillStatus::Failed);
    assert_eq!(split_bills.get_success_rate(SENDER).await.unwrap(), 0);

    split_bills.clear_split_bills(SENDER).await.unwrap();
    assert!(split_bills.get_split_bills(SENDER).await.unwrap().is_empty());
}

struct BrokenRewards;

#[async_trait]
impl RewardsInteractor for BrokenRewards {
    async fn get_reward_balance(&self, _address: &str) -> anyhow::Result<f64> {
        Ok(0.0)
    }

    async fn get_reward_history(&self, _address: &str) -> anyhow::Result<Vec<RewardTransaction>> {
        Ok(Vec::new())
    }

    async fn mint_rewards_for_payment(
        &self,
        _sender: &str,
        _payment_amount: f64,
        _transaction_hash: &str,
    ) -> anyhow::Result<bool> {
        anyhow::bail!("rewards ledger unavailable")
    }

    async fn redeem_rewards(&self, _address: &str, _rwd_amount: f64) -> anyhow::Result<Redemption> {
        anyhow::bail!("rewards ledger unavailable")
    }

    async fn can_redeem(&self, _address: &str, _rwd_amount: f64) -> anyhow::Result<bool> {
        Ok(false)
    }
}

#[tokio::test]
async fn reward_failures_do_not_fail_payments() {
    let provider = ScriptedProvider::new();
    let client = Arc::new(ShardeumClient::new(provider, fast_config().network));
    let split_bills = SplitBillInteractorImpl::new(
        AddressRepository::new(Arc::new(MemoryStore::new()), SPLIT_BILLS_KEY, MAX_SPLIT_BILLS),
        client,
        Arc::new(BrokenRewards),
        Duration::ZERO,
    );

    let outcome = split_bills.process_split_bill(SENDER, dinner()).await.unwrap();

    assert_eq!(outcome.bill.status, SplitBillStatus::Completed);
    assert_eq!(outcome.paid_count(), 3);
}
