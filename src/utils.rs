use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

lazy_static! {
    static ref ADDRESS_RE: Regex = Regex::new(r"^0x[a-fA-F0-9]{40}$").unwrap();
    static ref AMOUNT_RE: Regex = Regex::new(r"^(\d+(?:\.\d*)?|\.\d+)$").unwrap();
}

// Validate EVM address: 0x followed by 40 hex characters
pub fn validate_address(address: &str) -> bool {
    ADDRESS_RE.is_match(address)
}

// Parse a decimal amount typed by the user
pub fn parse_amount(input: &str) -> Option<f64> {
    let input = input.trim();
    if !AMOUNT_RE.is_match(input) {
        return None;
    }
    input.parse::<f64>().ok()
}

// Format amount with appropriate precision
pub fn format_amount(amount: f64, token: &str) -> String {
    match token.to_uppercase().as_str() {
        "SHM" => format!("{:.4}", amount),
        "RWD" => format!("{:.2}", amount),
        _ => format!("{:.6}", amount),
    }
}

// Shorten address for display
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }

    let start: String = chars[..6].iter().collect();
    let end: String = chars[chars.len() - 4..].iter().collect();

    format!("{}...{}", start, end)
}

/// Record identifier of the form `<prefix>_<epoch millis>_<9 random chars>`.
pub fn generate_id(prefix: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), &random[..9])
}

/// Round to four decimal places, the precision SHM amounts are kept at.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
