//! Routing fee and slippage bounds.
//!
//! The routing fee is the protocol's skim from a trade's final output. Its rate is
//! passed in by the host for every quote, which keeps promotion windows (a zero
//! rate) outside the engine.

use crate::amm::swap_output;
use crate::errors::{ConfigError, QuoteError, Result};
use crate::path::Trade;
use crate::utils::{scale_bps_ceil, scale_bps_floor, BPS_DENOMINATOR};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// How the routing fee reaches the treasury.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeCollection {
    /// Plain value transfer of the native asset
    NativeTransfer,
    /// `transfer(treasury, amount)` on the output token
    TokenTransfer,
}

/// A computed routing fee ready for planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingFee {
    /// Asset the fee is taken in (the trade's output asset)
    pub asset: String,
    pub amount: BigUint,
    /// Treasury address receiving the fee
    pub recipient: String,
    pub collection: FeeCollection,
}

/// Computes the routing fee for a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingFeeCalculator {
    fee_bps: u32,
}

impl RoutingFeeCalculator {
    /// Create a calculator for a routing fee of `fee_bps` basis points.
    ///
    /// Zero is valid and disables the fee.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidConfiguration` when the rate is above 100%.
    pub fn new(fee_bps: u32) -> Result<Self> {
        if fee_bps > BPS_DENOMINATOR {
            return Err(ConfigError::InvalidConfiguration {
                message: format!("routing fee {} bps exceeds 10000", fee_bps),
            }
            .into());
        }
        Ok(Self { fee_bps })
    }

    pub fn fee_bps(&self) -> u32 {
        self.fee_bps
    }

    /// Share of the output kept by the user, in basis points.
    pub fn ratio_bps(&self) -> u32 {
        BPS_DENOMINATOR - self.fee_bps
    }

    /// Final output the user receives after the routing fee.
    pub fn user_output(&self, trade: &Trade) -> BigUint {
        trade
            .output_amount()
            .map(|output| self.net_of_fee(output))
            .unwrap_or_default()
    }

    /// `floor(amount * ratio)`: what remains of `amount` once the fee is taken.
    pub fn net_of_fee(&self, amount: &BigUint) -> BigUint {
        scale_bps_floor(amount, self.ratio_bps())
    }

    /// Fee charged on a settled amount: `amount - floor(amount * ratio)`.
    pub fn fee_on(&self, amount: &BigUint) -> BigUint {
        amount - self.net_of_fee(amount)
    }

    /// Fee amount: `expected_output - floor(final_output * ratio)`, never negative.
    ///
    /// `expected_output` is the amount the trade is expected to deliver before any
    /// slippage adjustment; for a freshly priced trade it is the final hop output.
    pub fn fee_amount(&self, expected_output: &BigUint, trade: &Trade) -> BigUint {
        let kept = self.user_output(trade);
        if *expected_output > kept {
            expected_output - kept
        } else {
            BigUint::zero()
        }
    }

    /// Build the fee record for `trade`, or `None` when there is nothing to collect.
    ///
    /// The fee is charged on `settled_output`, the slippage-adjusted output the
    /// final swap is guaranteed to deliver, so the transfer never eats into the
    /// user's minimum.
    pub fn routing_fee(
        &self,
        trade: &Trade,
        settled_output: &BigUint,
        treasury: &str,
        native_asset: &str,
    ) -> Option<RoutingFee> {
        let asset = trade.output_token()?;
        let amount = self.fee_on(settled_output);
        if amount.is_zero() {
            return None;
        }

        let collection = if asset == native_asset {
            FeeCollection::NativeTransfer
        } else {
            FeeCollection::TokenTransfer
        };

        tracing::debug!(
            asset = asset,
            amount = %amount,
            fee_bps = self.fee_bps,
            collection = ?collection,
            "Routing fee computed"
        );

        Some(RoutingFee {
            asset: asset.to_string(),
            amount,
            recipient: treasury.to_string(),
            collection,
        })
    }
}

/// Spend and minimum output of one hop once slippage is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopBound {
    /// Amount granted to and sold by the hop
    pub spend: BigUint,
    /// Lowest output the swap accepts
    pub min_out: BigUint,
}

/// Slippage tolerance applied to quoted amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlippageTolerance {
    bps: u32,
}

impl SlippageTolerance {
    /// # Errors
    ///
    /// Returns `QuoteError::SlippageOutOfRange` above 10000 bps.
    pub fn from_bps(bps: u32) -> Result<Self> {
        if bps > BPS_DENOMINATOR {
            return Err(QuoteError::SlippageOutOfRange { slippage_bps: bps }.into());
        }
        Ok(Self { bps })
    }

    pub fn bps(&self) -> u32 {
        self.bps
    }

    /// Lowest acceptable output: `floor(amount * (1 - tolerance))`.
    pub fn min_output(&self, amount: &BigUint) -> BigUint {
        scale_bps_floor(amount, BPS_DENOMINATOR - self.bps)
    }

    /// Highest acceptable input: `ceil(amount * (1 + tolerance))`.
    pub fn max_input(&self, amount: &BigUint) -> BigUint {
        scale_bps_ceil(amount, BPS_DENOMINATOR + self.bps)
    }

    /// Execution bounds for every hop of `trade`.
    ///
    /// The first hop spends `first_spend` (its quoted input when `None`). Each
    /// later hop spends exactly the previous hop's minimum output, re-priced against
    /// the hop's quoted reserves, and tolerates an equal share of the tolerance.
    /// The last bound's `min_out` is the least the whole route settles for.
    ///
    /// # Errors
    ///
    /// Returns `TradeError` if a hop carries an invalid pool fee.
    pub fn hop_bounds(&self, trade: &Trade, first_spend: Option<&BigUint>) -> Result<Vec<HopBound>> {
        let Some(first) = trade.first() else {
            return Ok(Vec::new());
        };
        let per_hop = Self { bps: self.bps / trade.len() as u32 };
        let mut spend = first_spend.cloned().unwrap_or_else(|| first.amount_in.clone());
        let mut bounds = Vec::with_capacity(trade.len());

        for hop in trade.iter() {
            let expected = if spend == hop.amount_in {
                hop.amount_out.clone()
            } else {
                swap_output(&spend, hop.pool.reserve_in(), hop.pool.reserve_out(), hop.fee_bps)?
            };
            let min_out = per_hop.min_output(&expected);

            tracing::trace!(
                pool = hop.pool_address(),
                spend = %spend,
                expected = %expected,
                min_out = %min_out,
                "Hop bound"
            );

            bounds.push(HopBound { spend, min_out: min_out.clone() });
            spend = min_out;
        }

        Ok(bounds)
    }
}
