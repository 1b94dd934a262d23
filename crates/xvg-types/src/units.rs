//! Conversion between XVG decimal strings and atomic units.

use crate::constants::{COIN_DECIMALS, SATOSHIS_PER_XVG};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount must be a non-empty decimal number")]
    Empty,

    #[error("invalid amount: {0}")]
    Invalid(String),

    #[error("too many decimal places (max 6)")]
    TooPrecise,

    #[error("amount overflows u64")]
    Overflow,
}

/// Parse an XVG amount such as `"1.5"` into atomic units.
pub fn parse_amount(s: &str) -> Result<u64, AmountError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(AmountError::Invalid(s.to_string()));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::Invalid(s.to_string()));
    }
    if frac.len() > COIN_DECIMALS as usize {
        return Err(AmountError::TooPrecise);
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| AmountError::Overflow)?
    };
    let mut frac_units: u64 = 0;
    for (i, b) in frac.bytes().enumerate() {
        let digit = (b - b'0') as u64;
        frac_units += digit * 10u64.pow(COIN_DECIMALS - 1 - i as u32);
    }

    whole
        .checked_mul(SATOSHIS_PER_XVG)
        .and_then(|v| v.checked_add(frac_units))
        .ok_or(AmountError::Overflow)
}

/// Format atomic units as an XVG decimal string with all six decimals.
pub fn format_amount(units: u64) -> String {
    format!(
        "{}.{:06}",
        units / SATOSHIS_PER_XVG,
        units % SATOSHIS_PER_XVG
    )
}
