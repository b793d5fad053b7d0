use crate::chain::ShardeumClient;
use crate::entity::{
    FailedPayment, PayLinkError, SplitBill, SplitBillOutcome, SplitBillParticipant,
    SplitBillStats, SplitBillStatus, SplitMethod,
};
use crate::interactor::rewards_interactor::RewardsInteractor;
use crate::services::best_effort;
use crate::storage::AddressRepository;
use crate::utils::{format_amount, generate_id, round4, validate_address};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use log::{error, info};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Allowed gap between the declared total and the sum of the shares.
pub const SPLIT_TOLERANCE: f64 = 0.01;

/// Bill as entered by the user, before it is persisted.
#[derive(Debug, Clone)]
pub struct SplitBillDraft {
    pub title: String,
    pub description: Option<String>,
    pub total_amount: f64,
    pub participants: Vec<SplitBillParticipant>,
    pub split_method: SplitMethod,
}

/// Equal share rounded to 4 decimals. The shares may then miss the total by
/// up to `count * 0.00005`.
pub fn calculate_equal_split(total_amount: f64, participant_count: usize) -> f64 {
    if participant_count == 0 {
        return 0.0;
    }
    round4(total_amount / participant_count as f64)
}

pub fn apply_equal_split(total_amount: f64, participants: &mut [SplitBillParticipant]) {
    let share = calculate_equal_split(total_amount, participants.len());
    for participant in participants.iter_mut() {
        participant.amount = share;
    }
}

pub fn validate_split_bill(
    title: &str,
    total_amount: f64,
    participants: &[SplitBillParticipant],
) -> Result<(), PayLinkError> {
    let invalid = |message: String| Err(PayLinkError::Validation(message));

    if title.trim().is_empty() {
        return invalid("Please enter a bill title".to_string());
    }
    if !total_amount.is_finite() || total_amount <= 0.0 {
        return invalid("Please enter a valid total amount".to_string());
    }
    if participants.is_empty() {
        return invalid("Please add at least one participant".to_string());
    }

    let unique: HashSet<String> = participants
        .iter()
        .map(|p| p.address.to_lowercase())
        .collect();
    if unique.len() != participants.len() {
        return invalid("Duplicate wallet addresses found".to_string());
    }

    for participant in participants {
        if !validate_address(&participant.address) {
            return invalid(format!("Invalid wallet address for {}", participant.name));
        }
        if !participant.amount.is_finite() || participant.amount <= 0.0 {
            return invalid(format!("Invalid amount for {}", participant.name));
        }
    }

    let split_total: f64 = participants.iter().map(|p| p.amount).sum();
    if (total_amount - split_total).abs() > SPLIT_TOLERANCE {
        return invalid(format!(
            "Split amounts ({} SHM) don't match total ({} SHM)",
            format_amount(split_total, "SHM"),
            total_amount
        ));
    }

    Ok(())
}

pub fn create_split_bill(draft: SplitBillDraft, created_by: &str) -> SplitBill {
    let participants = draft
        .participants
        .into_iter()
        .map(|p| SplitBillParticipant {
            is_paid: false,
            transaction_hash: None,
            ..p
        })
        .collect();

    SplitBill {
        id: generate_id("split"),
        title: draft.title,
        description: draft.description.filter(|d| !d.trim().is_empty()),
        total_amount: draft.total_amount,
        created_by: created_by.to_string(),
        created_at: Utc::now(),
        participants,
        split_method: draft.split_method,
        status: SplitBillStatus::Pending,
        completed_at: None,
    }
}

pub fn format_participants(participants: &[SplitBillParticipant]) -> String {
    match participants {
        [] => "No participants".to_string(),
        [only] => only.name.clone(),
        [first, second] => format!("{} and {}", first.name, second.name),
        [first, second, rest @ ..] => {
            format!("{}, {} and {} others", first.name, second.name, rest.len())
        }
    }
}

pub fn compute_stats(bills: &[SplitBill]) -> SplitBillStats {
    let count = |status: SplitBillStatus| bills.iter().filter(|b| b.status == status).count();

    SplitBillStats {
        total: bills.len(),
        pending: count(SplitBillStatus::Pending),
        processing: count(SplitBillStatus::Processing),
        completed: count(SplitBillStatus::Completed),
        failed: count(SplitBillStatus::Failed),
        total_amount: bills.iter().map(|b| b.total_amount).sum(),
        total_participants: bills.iter().map(|b| b.participants.len()).sum(),
    }
}

#[async_trait]
pub trait SplitBillInteractor: Send + Sync {
    async fn save_split_bill(&self, bill: &SplitBill) -> Result<()>;
    async fn get_split_bills(&self, address: &str) -> Result<Vec<SplitBill>>;
    /// Set the bill status (and participants, when given). Completion stamps `completed_at`.
    async fn update_split_bill_status(
        &self,
        address: &str,
        split_bill_id: &str,
        status: SplitBillStatus,
        participants: Option<Vec<SplitBillParticipant>>,
    ) -> Result<SplitBill>;
    async fn get_split_bill_stats(&self, address: &str) -> Result<SplitBillStats>;
    /// Percentage of stored bills that completed, rounded.
    async fn get_success_rate(&self, address: &str) -> Result<u32>;
    async fn clear_split_bills(&self, address: &str) -> Result<()>;
    /// Validate, persist and pay every participant in order.
    async fn process_split_bill(&self, sender: &str, draft: SplitBillDraft) -> Result<SplitBillOutcome>;
}

pub struct SplitBillInteractorImpl {
    repository: AddressRepository<SplitBill>,
    client: Arc<ShardeumClient>,
    rewards: Arc<dyn RewardsInteractor>,
    payment_delay: Duration,
}

impl SplitBillInteractorImpl {
    pub fn new(
        repository: AddressRepository<SplitBill>,
        client: Arc<ShardeumClient>,
        rewards: Arc<dyn RewardsInteractor>,
        payment_delay: Duration,
    ) -> Self {
        Self {
            repository,
            client,
            rewards,
            payment_delay,
        }
    }

    // One participant payment: submit, then best-effort reward mint
    async fn pay_participant(&self, sender: &str, participant: &SplitBillParticipant) -> Result<String> {
        info!(
            "[SplitBill] Sending {} SHM to {} ({})",
            participant.amount, participant.name, participant.address
        );

        let hash = self
            .client
            .send_transaction(&participant.address, participant.amount)
            .await?;

        let minted = best_effort(
            &format!("Minting rewards for payment to {}", participant.name),
            self.rewards
                .mint_rewards_for_payment(sender, participant.amount, &hash),
        )
        .await;
        if minted == Some(true) {
            info!("[SplitBill] Rewards minted for payment to {}", participant.name);
        }

        Ok(hash)
    }
}

#[async_trait]
impl SplitBillInteractor for SplitBillInteractorImpl {
    async fn save_split_bill(&self, bill: &SplitBill) -> Result<()> {
        self.repository
            .push_front(&bill.created_by, bill.clone())
            .await?;
        info!("[SplitBill] Saved split bill: {}", bill.title);
        Ok(())
    }

    async fn get_split_bills(&self, address: &str) -> Result<Vec<SplitBill>> {
        self.repository.get(address).await
    }

    async fn update_split_bill_status(
        &self,
        address: &str,
        split_bill_id: &str,
        status: SplitBillStatus,
        participants: Option<Vec<SplitBillParticipant>>,
    ) -> Result<SplitBill> {
        let updated = self
            .repository
            .update(address, |bills| {
                let bill = bills
                    .iter_mut()
                    .find(|b| b.id == split_bill_id)
                    .ok_or_else(|| PayLinkError::SplitBillNotFound(split_bill_id.to_string()))?;

                bill.status = status;
                if let Some(participants) = participants {
                    bill.participants = participants;
                }
                if status == SplitBillStatus::Completed {
                    bill.completed_at = Some(Utc::now());
                }
                Ok(bill.clone())
            })
            .await?;

        info!("[SplitBill] Updated status for {} to {}", split_bill_id, status);

        Ok(updated)
    }

    async fn get_split_bill_stats(&self, address: &str) -> Result<SplitBillStats> {
        Ok(compute_stats(&self.get_split_bills(address).await?))
    }

    async fn get_success_rate(&self, address: &str) -> Result<u32> {
        let stats = self.get_split_bill_stats(address).await?;
        if stats.total == 0 {
            return Ok(0);
        }
        Ok(((stats.completed as f64 / stats.total as f64) * 100.0).round() as u32)
    }

    async fn clear_split_bills(&self, address: &str) -> Result<()> {
        self.repository.clear(address).await?;
        info!("[SplitBill] Cleared all split bills for {}", address);
        Ok(())
    }

    async fn process_split_bill(&self, sender: &str, draft: SplitBillDraft) -> Result<SplitBillOutcome> {
        if sender.is_empty() {
            return Err(PayLinkError::WalletNotConnected.into());
        }

        validate_split_bill(&draft.title, draft.total_amount, &draft.participants)?;

        let total_to_send: f64 = draft.participants.iter().map(|p| p.amount).sum();
        let balance = self.client.get_balance(sender).await?;
        if total_to_send > balance {
            return Err(PayLinkError::Validation(format!(
                "Insufficient balance. Need {} SHM, have {} SHM",
                format_amount(total_to_send, "SHM"),
                format_amount(balance, "SHM")
            ))
            .into());
        }

        let bill = create_split_bill(draft, sender);
        self.save_split_bill(&bill).await?;
        let mut bill = self
            .update_split_bill_status(sender, &bill.id, SplitBillStatus::Processing, None)
            .await?;

        // Sequential on purpose: one wallet prompt at a time. A failure is
        // recorded and the loop moves on; earlier payments are never undone.
        let mut failed_payments = Vec::new();
        for participant in bill.participants.iter_mut() {
            match self.pay_participant(sender, participant).await {
                Ok(hash) => {
                    participant.is_paid = true;
                    participant.transaction_hash = Some(hash);

                    if !self.payment_delay.is_zero() {
                        sleep(self.payment_delay).await;
                    }
                }
                Err(e) => {
                    error!(
                        "[SplitBill] Failed to send payment to {}: {}",
                        participant.name, e
                    );
                    failed_payments.push(FailedPayment {
                        name: participant.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        // Any failure fails the whole bill, even when most payments went out.
        let final_status = if failed_payments.is_empty() {
            SplitBillStatus::Completed
        } else {
            SplitBillStatus::Failed
        };

        let bill = match self
            .update_split_bill_status(sender, &bill.id, final_status, Some(bill.participants.clone()))
            .await
        {
            Ok(bill) => bill,
            Err(e) => {
                error!("[SplitBill] Split bill processing failed: {}", e);
                best_effort(
                    "Marking split bill failed",
                    self.update_split_bill_status(sender, &bill.id, SplitBillStatus::Failed, None),
                )
                .await;
                return Err(e);
            }
        };

        Ok(SplitBillOutcome {
            bill,
            failed_payments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(name: &str, digit: char, amount: f64) -> SplitBillParticipant {
        let address = format!("0x{}", digit.to_string().repeat(40));
        SplitBillParticipant::new(name, &address, amount)
    }

    fn expect_message(result: Result<(), PayLinkError>) -> String {
        match result {
            Err(PayLinkError::Validation(message)) => message,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn equal_split_rounds_to_four_decimals() {
        assert_eq!(calculate_equal_split(100.0, 3), 33.3333);
        assert_eq!(calculate_equal_split(10.0, 4), 2.5);
        assert_eq!(calculate_equal_split(10.0, 0), 0.0);
    }

    #[test]
    fn equal_split_drift_stays_within_rounding_bound() {
        for (total, count) in [(100.0, 3usize), (1.0, 7), (12.3457, 9), (0.5, 6)] {
            let share = calculate_equal_split(total, count);
            let drift = (share * count as f64 - total).abs();
            assert!(drift <= count as f64 * 0.00005 + 1e-9, "{} / {}", total, count);
        }
    }

    #[test]
    fn equal_split_of_three_passes_validation() {
        let mut people = vec![
            participant("Alice", '1', 0.0),
            participant("Bob", '2', 0.0),
            participant("Charlie", '3', 0.0),
        ];
        apply_equal_split(100.0, &mut people);

        assert!(people.iter().all(|p| p.amount == 33.3333));
        assert!(validate_split_bill("Dinner Bill", 100.0, &people).is_ok());
    }

    #[test]
    fn mismatched_shares_cite_split_total() {
        let people = vec![participant("Alice", '1', 50.0), participant("Bob", '2', 60.0)];
        let message = expect_message(validate_split_bill("Dinner", 100.0, &people));
        assert_eq!(message, "Split amounts (110.0000 SHM) don't match total (100 SHM)");
    }

    #[test]
    fn rejects_each_invalid_input() {
        let ok = vec![participant("Alice", '1', 10.0)];

        assert_eq!(
            expect_message(validate_split_bill("  ", 10.0, &ok)),
            "Please enter a bill title"
        );
        assert_eq!(
            expect_message(validate_split_bill("Lunch", 0.0, &ok)),
            "Please enter a valid total amount"
        );
        assert_eq!(
            expect_message(validate_split_bill("Lunch", -5.0, &ok)),
            "Please enter a valid total amount"
        );
        assert_eq!(
            expect_message(validate_split_bill("Lunch", 10.0, &[])),
            "Please add at least one participant"
        );

        let mut bad_address = participant("Mallory", '1', 10.0);
        bad_address.address = "0x1234".to_string();
        assert_eq!(
            expect_message(validate_split_bill("Lunch", 10.0, &[bad_address])),
            "Invalid wallet address for Mallory"
        );

        let zero = participant("Zed", '1', 0.0);
        assert_eq!(
            expect_message(validate_split_bill("Lunch", 10.0, &[zero])),
            "Invalid amount for Zed"
        );

        let dupes = vec![participant("A", 'a', 5.0), {
            let mut p = participant("B", 'a', 5.0);
            p.address = p.address.to_uppercase().replacen("0X", "0x", 1);
            p
        }];
        assert_eq!(
            expect_message(validate_split_bill("Lunch", 10.0, &dupes)),
            "Duplicate wallet addresses found"
        );
    }

    #[test]
    fn small_drift_is_tolerated() {
        let people = vec![participant("Alice", '1', 50.005), participant("Bob", '2', 50.0)];
        assert!(validate_split_bill("Dinner", 100.0, &people).is_ok());
    }

    #[test]
    fn participant_summary() {
        let a = participant("Alice", '1', 1.0);
        let b = participant("Bob", '2', 1.0);
        let c = participant("Charlie", '3', 1.0);
        let d = participant("Dana", '4', 1.0);

        assert_eq!(format_participants(&[]), "No participants");
        assert_eq!(format_participants(&[a.clone()]), "Alice");
        assert_eq!(format_participants(&[a.clone(), b.clone()]), "Alice and Bob");
        assert_eq!(
            format_participants(&[a, b, c, d]),
            "Alice, Bob and 2 others"
        );
    }

    #[test]
    fn created_bill_starts_pending_and_unpaid() {
        let mut paid = participant("Alice", '1', 5.0);
        paid.is_paid = true;
        let draft = SplitBillDraft {
            title: "Taxi".to_string(),
            description: Some(" ".to_string()),
            total_amount: 5.0,
            participants: vec![paid],
            split_method: SplitMethod::Custom,
        };

        let bill = create_split_bill(draft, "0xabc");
        assert!(bill.id.starts_with("split_"));
        assert_eq!(bill.status, SplitBillStatus::Pending);
        assert_eq!(bill.description, None);
        assert!(!bill.participants[0].is_paid);
        assert_eq!(bill.completed_at, None);
    }
}
