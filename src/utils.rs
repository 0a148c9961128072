//! Utility functions and type conversions.
//!
//! Bridges the big-integer arithmetic used for pricing and the fixed-width types
//! used on chain, and provides the basis-point helpers shared by fee, slippage and
//! configuration code.
//!
//! # Core Functionality
//!
//! - **Type Conversions**: Safe conversions between U256 and BigUint
//! - **Address Handling**: Parsing and validation of EVM addresses
//! - **Amount Parsing**: Decimal or `0x` hex strings into BigUint
//! - **Basis Points**: Exact percent parsing and floor/ceil scaling

use crate::errors::{Result, UtilityError};
use alloy::primitives::{Address, U256};
use num_bigint::BigUint;
use num_traits::{Num, Zero};
use std::str::FromStr;

/// Denominator for every basis-point ratio in the crate.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Parse a string representation of an EVM address.
///
/// Accepts addresses with or without the "0x" prefix. The address must be exactly
/// 20 bytes (40 hex characters).
///
/// # Errors
///
/// Returns `UtilityError::AddressParsingFailed` when the string is not a valid
/// 20-byte hex address.
pub fn string_to_h160(s: &str) -> Result<Address> {
    Address::from_str(s.trim_start_matches("0x"))
        .map_err(|source| UtilityError::AddressParsingFailed {
            input: s.to_string(),
            source: alloy::primitives::AddressError::Hex(source),
        }.into())
}

/// Convert a BigUint to an unsigned 256-bit integer.
///
/// # Errors
///
/// Returns `UtilityError::ValueTooLarge` if the value needs more than 32 bytes.
pub fn biguint_to_u256(value: &BigUint) -> Result<U256> {
    let bytes = value.to_bytes_be();
    if bytes.len() > 32 {
        return Err(UtilityError::ValueTooLarge.into());
    }
    Ok(U256::from_be_slice(&bytes))
}

/// Convert an unsigned 256-bit integer to a BigUint.
pub fn u256_to_biguint(value: U256) -> BigUint {
    BigUint::from_bytes_be(&value.to_be_bytes::<32>())
}

/// Parse an amount given as a decimal string or a `0x`-prefixed hex string.
pub fn parse_amount(input: &str) -> Result<BigUint> {
    let trimmed = input.trim();
    let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex_digits) => BigUint::from_str_radix(hex_digits, 16).ok(),
        None => BigUint::from_str(trimmed).ok(),
    };

    parsed.ok_or_else(|| UtilityError::InvalidAmount { input: input.to_string() }.into())
}

/// Convert a percentage string such as `"0.35"` or `"1"` into basis points.
///
/// Parsing is exact: at most two fractional digits are accepted and no floating
/// point is involved.
pub fn percent_to_bps(input: &str) -> Result<u32> {
    let invalid = |reason: &str| UtilityError::InvalidPercentage {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = input.trim().trim_end_matches('%');
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("empty value").into());
    }
    if fraction.len() > 2 {
        return Err(invalid("more than two fractional digits").into());
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid("not a non-negative decimal").into());
    }

    let whole: u32 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("value too large"))?
    };
    let fraction: u32 = format!("{:0<2}", fraction)
        .parse()
        .map_err(|_| invalid("not a non-negative decimal"))?;

    let bps = whole
        .checked_mul(100)
        .and_then(|bps| bps.checked_add(fraction))
        .ok_or_else(|| invalid("value too large"))?;

    if bps > BPS_DENOMINATOR {
        return Err(invalid("exceeds 100%").into());
    }
    Ok(bps)
}

/// Scale `amount` by `numerator_bps / 10000`, rounding down.
pub fn scale_bps_floor(amount: &BigUint, numerator_bps: u32) -> BigUint {
    amount * BigUint::from(numerator_bps) / BigUint::from(BPS_DENOMINATOR)
}

/// Scale `amount` by `numerator_bps / 10000`, rounding up.
pub fn scale_bps_ceil(amount: &BigUint, numerator_bps: u32) -> BigUint {
    div_ceil(&(amount * BigUint::from(numerator_bps)), &BigUint::from(BPS_DENOMINATOR))
}

/// Integer division rounding toward positive infinity. A zero divisor yields zero.
pub fn div_ceil(numerator: &BigUint, denominator: &BigUint) -> BigUint {
    if denominator.is_zero() {
        return BigUint::zero();
    }
    let quotient = numerator / denominator;
    if (&quotient * denominator) == *numerator {
        quotient
    } else {
        quotient + 1u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_to_h160_with_and_without_prefix() {
        let with_prefix = string_to_h160("0x00000000000000000000000000000000000000aa").unwrap();
        let without_prefix = string_to_h160("00000000000000000000000000000000000000aa").unwrap();
        assert_eq!(with_prefix, without_prefix);
        assert!(string_to_h160("0x1234").is_err());
    }

    #[test]
    fn test_u256_conversions() {
        let value = BigUint::from(123_456_789u64);
        let converted = biguint_to_u256(&value).unwrap();
        assert_eq!(converted, U256::from(123_456_789u64));
        assert_eq!(u256_to_biguint(converted), value);

        let too_large = BigUint::from(1u32) << 256;
        assert!(biguint_to_u256(&too_large).is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1000000").unwrap(), BigUint::from(1_000_000u32));
        assert_eq!(parse_amount("0xff").unwrap(), BigUint::from(255u32));
        assert!(parse_amount("-5").is_err());
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn test_percent_to_bps() {
        assert_eq!(percent_to_bps("0.3").unwrap(), 30);
        assert_eq!(percent_to_bps("0.35").unwrap(), 35);
        assert_eq!(percent_to_bps("0.5%").unwrap(), 50);
        assert_eq!(percent_to_bps("1").unwrap(), 100);
        assert_eq!(percent_to_bps(".21").unwrap(), 21);
        assert!(percent_to_bps("0.125").is_err());
        assert!(percent_to_bps("101").is_err());
        assert!(percent_to_bps("-1").is_err());
    }

    #[test]
    fn test_bps_scaling_rounds_in_opposite_directions() {
        let amount = BigUint::from(1001u32);
        assert_eq!(scale_bps_floor(&amount, 5_000), BigUint::from(500u32));
        assert_eq!(scale_bps_ceil(&amount, 5_000), BigUint::from(501u32));
        assert_eq!(div_ceil(&BigUint::from(10u32), &BigUint::from(5u32)), BigUint::from(2u32));
    }
}
