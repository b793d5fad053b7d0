use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRequest {
    pub to: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Decoded content of a scanned payment QR code.
#[derive(Debug, Clone, PartialEq)]
pub struct QrPaymentData {
    pub address: String,
    pub amount: Option<f64>,
    pub note: Option<String>,
}
