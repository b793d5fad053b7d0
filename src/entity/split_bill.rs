use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SplitMethod {
    #[default]
    Equal,
    Custom,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SplitBillStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl std::fmt::Display for SplitBillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SplitBillStatus::Pending => write!(f, "pending"),
            SplitBillStatus::Processing => write!(f, "processing"),
            SplitBillStatus::Completed => write!(f, "completed"),
            SplitBillStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One recipient of a split bill. Owned by its bill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SplitBillParticipant {
    pub id: String,
    pub name: String,
    pub address: String,
    pub amount: f64,
    pub is_paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

impl SplitBillParticipant {
    pub fn new(name: &str, address: &str, amount: f64) -> Self {
        Self {
            id: crate::utils::generate_id("participant"),
            name: name.trim().to_string(),
            address: address.trim().to_string(),
            amount,
            is_paid: false,
            transaction_hash: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SplitBill {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub total_amount: f64,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<SplitBillParticipant>,
    pub split_method: SplitMethod,
    pub status: SplitBillStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Aggregate counters over the stored bills of one wallet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SplitBillStats {
    pub total: usize,
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
    pub total_amount: f64,
    pub total_participants: usize,
}

/// A participant payment that did not go through.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedPayment {
    pub name: String,
    pub error: String,
}

/// Result of running a split bill through the payment loop.
#[derive(Debug, Clone)]
pub struct SplitBillOutcome {
    pub bill: SplitBill,
    pub failed_payments: Vec<FailedPayment>,
}

impl SplitBillOutcome {
    pub fn paid_count(&self) -> usize {
        self.bill.participants.iter().filter(|p| p.is_paid).count()
    }

    /// User-facing summary naming the participants whose payment failed.
    pub fn error_message(&self) -> Option<String> {
        if self.failed_payments.is_empty() {
            return None;
        }
        let names: Vec<&str> = self
            .failed_payments
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        Some(format!("Some payments failed: {}", names.join(", ")))
    }
}
