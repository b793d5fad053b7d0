use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RewardKind {
    Earned,
    Redeemed,
}

/// Ledger entry of the RWD loyalty program.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RewardTransaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RewardKind,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_amount: Option<f64>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Redemption {
    pub rwd_amount: f64,
    pub shm_amount: f64,
    pub transaction_hash: String,
}
