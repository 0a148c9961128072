//! Constant-product pricing for a single hop.
//!
//! Both directions of the calculation use exact big-integer arithmetic with fees
//! expressed in basis points:
//!
//! ```text
//! amount_out = floor(amount_in * (10000 - fee) * reserve_out
//!                    / (reserve_in * 10000 + amount_in * (10000 - fee)))
//!
//! amount_in  = ceil(reserve_in * amount_out * 10000
//!                   / ((reserve_out - amount_out) * (10000 - fee)))
//! ```
//!
//! The inverse is the smallest input whose forward output reaches `amount_out`.

use crate::errors::TradeError;
use crate::TradeResult;
use crate::graph::PoolType;
use crate::utils::{div_ceil, BPS_DENOMINATOR};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Swap fee per pool type, in basis points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    overrides: BTreeMap<PoolType, u32>,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self { overrides: BTreeMap::new() }
    }
}

impl FeeSchedule {
    /// Fee table using each pool type's default fee.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the fee for one pool type.
    pub fn with_fee(mut self, pool_type: PoolType, fee_bps: u32) -> Self {
        self.overrides.insert(pool_type, fee_bps);
        self
    }

    pub fn set_fee(&mut self, pool_type: PoolType, fee_bps: u32) {
        self.overrides.insert(pool_type, fee_bps);
    }

    /// Effective fee for `pool_type`.
    pub fn fee_bps(&self, pool_type: PoolType) -> u32 {
        self.overrides
            .get(&pool_type)
            .copied()
            .unwrap_or_else(|| pool_type.default_fee_bps())
    }

    /// Every pool type with its effective fee.
    pub fn entries(&self) -> impl Iterator<Item = (PoolType, u32)> + '_ {
        PoolType::ALL.into_iter().map(move |pool_type| (pool_type, self.fee_bps(pool_type)))
    }
}

fn fee_multiplier(fee_bps: u32) -> TradeResult<BigUint> {
    BPS_DENOMINATOR
        .checked_sub(fee_bps)
        .map(BigUint::from)
        .ok_or(TradeError::InvalidFee { fee_bps })
}

/// Output of a single hop for an exact input amount.
///
/// Zero input or a zero reserve yields zero output, which callers treat as an
/// unviable hop.
///
/// # Errors
///
/// Returns `TradeError::InvalidFee` when `fee_bps` exceeds 10000.
pub fn swap_output(
    amount_in: &BigUint,
    reserve_in: &BigUint,
    reserve_out: &BigUint,
    fee_bps: u32,
) -> TradeResult<BigUint> {
    let multiplier = fee_multiplier(fee_bps)?;
    if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
        return Ok(BigUint::zero());
    }

    let amount_in_with_fee = amount_in * &multiplier;
    let numerator = &amount_in_with_fee * reserve_out;
    let denominator = reserve_in * BigUint::from(BPS_DENOMINATOR) + amount_in_with_fee;

    Ok(numerator / denominator)
}

/// Minimal input that makes a single hop deliver at least `amount_out`.
///
/// Returns `Ok(None)` when no input can achieve it: zero requested output, output
/// not strictly below `reserve_out`, a zero reserve, or a 100% fee.
///
/// # Errors
///
/// Returns `TradeError::InvalidFee` when `fee_bps` exceeds 10000.
pub fn swap_input(
    amount_out: &BigUint,
    reserve_in: &BigUint,
    reserve_out: &BigUint,
    fee_bps: u32,
) -> TradeResult<Option<BigUint>> {
    let multiplier = fee_multiplier(fee_bps)?;
    if multiplier.is_zero()
        || amount_out.is_zero()
        || reserve_in.is_zero()
        || amount_out >= reserve_out
    {
        return Ok(None);
    }

    let numerator = reserve_in * amount_out * BigUint::from(BPS_DENOMINATOR);
    let denominator = (reserve_out - amount_out) * multiplier;

    Ok(Some(div_ceil(&numerator, &denominator)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(value: u64) -> BigUint {
        BigUint::from(value)
    }

    #[test]
    fn test_swap_output_reference_pool() {
        let out = swap_output(&big(10_000), &big(1_000_000), &big(2_000_000), 30).unwrap();
        // floor(9970 * 2_000_000 / 1_009_970)
        assert_eq!(out, big(19_743));
    }

    #[test]
    fn test_swap_output_zero_cases() {
        assert_eq!(swap_output(&big(0), &big(100), &big(100), 30).unwrap(), big(0));
        assert_eq!(swap_output(&big(10), &big(0), &big(100), 30).unwrap(), big(0));
        assert_eq!(swap_output(&big(10), &big(100), &big(0), 30).unwrap(), big(0));
    }

    #[test]
    fn test_swap_output_never_drains_reserve() {
        let reserve_out = big(1_000);
        let out = swap_output(&big(u64::MAX), &big(1_000), &reserve_out, 0).unwrap();
        assert!(out < reserve_out);
    }

    #[test]
    fn test_swap_output_is_monotonic_in_input() {
        let reserve_in = big(1_000_000);
        let reserve_out = big(2_000_000);

        for fee_bps in [0u32, 21, 30, 35, 9_999] {
            let mut previous = big(0);
            for step in 0..2_000u64 {
                let amount_in = big(step * step * 37);
                let out = swap_output(&amount_in, &reserve_in, &reserve_out, fee_bps).unwrap();
                assert!(out >= previous, "output fell at input {} with fee {}", amount_in, fee_bps);
                assert!(out < reserve_out);
                previous = out;
            }
        }
    }

    #[test]
    fn test_invalid_fee_is_an_error() {
        assert!(swap_output(&big(1), &big(1), &big(1), 10_001).is_err());
        assert!(swap_input(&big(1), &big(1), &big(2), 10_001).is_err());
    }

    #[test]
    fn test_swap_input_is_minimal_inverse() {
        let reserve_in = big(1_000_000);
        let reserve_out = big(2_000_000);

        for (amount_out, fee_bps) in [(19_743u64, 30u32), (1, 30), (500_000, 35), (1_999_999, 21)] {
            let amount_out = big(amount_out);
            let amount_in = swap_input(&amount_out, &reserve_in, &reserve_out, fee_bps)
                .unwrap()
                .unwrap();

            let achieved = swap_output(&amount_in, &reserve_in, &reserve_out, fee_bps).unwrap();
            assert!(achieved >= amount_out);

            let one_less = &amount_in - 1u32;
            let short = swap_output(&one_less, &reserve_in, &reserve_out, fee_bps).unwrap();
            assert!(short < amount_out);
        }
    }

    #[test]
    fn test_swap_input_unreachable_outputs() {
        assert_eq!(swap_input(&big(100), &big(50), &big(100), 30).unwrap(), None);
        assert_eq!(swap_input(&big(101), &big(50), &big(100), 30).unwrap(), None);
        assert_eq!(swap_input(&big(0), &big(50), &big(100), 30).unwrap(), None);
        assert_eq!(swap_input(&big(10), &big(50), &big(100), 10_000).unwrap(), None);
    }

    #[test]
    fn test_fee_schedule_overrides() {
        let schedule = FeeSchedule::new().with_fee(PoolType::V2Plus, 50);
        assert_eq!(schedule.fee_bps(PoolType::V2Classic), 30);
        assert_eq!(schedule.fee_bps(PoolType::V2Plus), 50);
        assert_eq!(schedule.fee_bps(PoolType::V2Lite), 21);
        assert_eq!(schedule.entries().count(), 3);
    }
}
