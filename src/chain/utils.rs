use crate::entity::PayLinkError;
use anyhow::{anyhow, Result};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

// Constants for conversion
pub const WEI_PER_SHM: u64 = 1_000_000_000_000_000_000;

/// Convert an SHM amount to wei, flooring any dust below one wei.
pub fn shm_to_wei(amount: f64) -> Result<u128> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(PayLinkError::InvalidAmount.into());
    }

    let amount = Decimal::from_f64(amount).ok_or(PayLinkError::InvalidAmount)?;
    let wei = amount
        .checked_mul(Decimal::from(WEI_PER_SHM))
        .ok_or(PayLinkError::InvalidAmount)?
        .floor();

    wei.to_u128().ok_or_else(|| PayLinkError::InvalidAmount.into())
}

/// Convert wei to SHM
pub fn wei_to_shm(wei: u128) -> f64 {
    Decimal::from_u128(wei)
        .and_then(|w| (w / Decimal::from(WEI_PER_SHM)).to_f64())
        .unwrap_or(wei as f64 / WEI_PER_SHM as f64)
}

/// Parse a `0x`-prefixed JSON-RPC quantity.
pub fn parse_hex_quantity(value: &str) -> Result<u128> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| anyhow!("Quantity is not 0x-prefixed: {}", value))?;

    if digits.is_empty() {
        return Ok(0);
    }

    u128::from_str_radix(digits, 16).map_err(|e| anyhow!("Invalid hex quantity {}: {}", value, e))
}

pub fn to_hex_quantity(value: u128) -> String {
    format!("0x{:x}", value)
}

/// Parse the leading decimal digits of a wei string, the way a `value=` QR field is read.
pub fn parse_wei_digits(value: &str) -> Option<u128> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u128>().ok()
}
