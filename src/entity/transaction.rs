use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Completed => write!(f, "completed"),
            TransactionStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Send,
    Receive,
}

/// A payment recorded in the local history of a wallet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
    pub hash: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Transaction {
    /// Builds the pending `send` record written right after submission.
    pub fn pending_send(from: &str, to: &str, amount: f64, hash: &str, note: Option<String>) -> Self {
        Self {
            id: hash.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            amount,
            timestamp: Utc::now(),
            status: TransactionStatus::Pending,
            hash: hash.to_string(),
            kind: TransactionType::Send,
            note: note.filter(|n| !n.trim().is_empty()),
        }
    }
}
