//! Token amount scaling between human units and raw integer units.
//!
//! Request bodies carry amounts the way a person types them ("1000",
//! "0.5"); storage writes and contract calls need the raw integer scaled by
//! the token's decimals.

use alloy::primitives::utils::{format_units, parse_units, UnitsError};
use alloy::primitives::{B256, U256};

use crate::error::{CoreError, Result};

/// Split a non-negative decimal into its whole and fractional digits.
fn split_decimal(amount: &str) -> Result<(&str, &str)> {
    let invalid = |reason: &str| CoreError::InvalidAmount {
        amount: amount.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty"));
    }
    if trimmed.starts_with('-') {
        return Err(invalid("negative"));
    }

    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("no digits"));
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return Err(invalid("not a decimal number"));
    }
    Ok((whole, fraction))
}

/// Check that `amount` is a non-negative decimal ("1000", "0.5", ".5", "2.").
pub fn validate_decimal(amount: &str) -> Result<()> {
    split_decimal(amount).map(|_| ())
}

/// Parse a human amount into raw units.
///
/// Example: parse_amount("1000", 6) = 1_000_000_000
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256> {
    let (whole, fraction) = split_decimal(amount)?;

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(CoreError::InvalidAmount {
            amount: amount.to_string(),
            reason: format!("more than {} fractional digits", decimals),
        });
    }

    let whole = match whole.trim_start_matches('0') {
        "" => "0",
        digits => digits,
    };
    let normalized = if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    };

    let overflow = || CoreError::AmountOverflow(amount.to_string());
    let raw: U256 = parse_units(&normalized, decimals)
        .map_err(|e| match e {
            UnitsError::InvalidUnit(_) => CoreError::UnsupportedDecimals(decimals),
            UnitsError::ParseSigned(_) => overflow(),
        })?
        .into();

    // parse_units scales with a wrapping multiply; a wrapped result no longer
    // formats back to the input
    if format_amount(raw, decimals)? != normalized {
        return Err(overflow());
    }
    Ok(raw)
}

/// Format raw units as a human amount, trimming trailing zeros.
///
/// Example: format_amount(1_500_000, 6) = "1.5"
pub fn format_amount(raw: U256, decimals: u8) -> Result<String> {
    let formatted =
        format_units(raw, decimals).map_err(|_| CoreError::UnsupportedDecimals(decimals))?;
    Ok(formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string())
}

/// Encode a raw amount as a 32-byte big-endian storage word.
#[inline(always)]
pub fn to_word(value: U256) -> B256 {
    B256::from(value)
}
