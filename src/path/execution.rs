//! Trade pricing for a single route.
//!
//! This module turns a `RouteCombination` into a `Trade` with concrete amounts on
//! every hop, in either exact-input or exact-output mode. Unviable routes come back
//! as an empty trade; only arithmetic faults are errors.

use crate::amm::{swap_input, swap_output, FeeSchedule};
use crate::errors::{Result, TradeError};
use crate::path::{RouteCombination, RouteValidator, Trade, TradeMode, TradeOperation};
use num_bigint::BigUint;
use num_traits::Zero;

/// Prices routes against the reserves captured in their directed pools.
#[derive(Debug, Clone, Default)]
pub struct TradeBuilder {
    /// Swap fee per pool type
    fees: FeeSchedule,
}

impl TradeBuilder {
    /// Create a trade builder with the given fee table.
    pub fn new(fees: FeeSchedule) -> Self {
        Self { fees }
    }

    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    /// Price `route` for `amount` in the given mode.
    pub fn build(&self, mode: TradeMode, amount: &BigUint, route: &RouteCombination) -> Result<Trade> {
        match mode {
            TradeMode::ExactInput => self.build_exact_input(amount, route),
            TradeMode::ExactOutput => self.build_exact_output(amount, route),
        }
    }

    /// Walk the route forward from a fixed input amount.
    ///
    /// # Returns
    ///
    /// A consistent trade, or an empty trade if any hop yields zero output or is
    /// asked to absorb more than its input reserve.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The route is disconnected or reuses a pool
    /// - A configured fee is outside 0..=10000 bps
    pub fn build_exact_input(&self, amount_in: &BigUint, route: &RouteCombination) -> Result<Trade> {
        if route.is_empty() {
            return Ok(Trade::empty());
        }
        RouteValidator::validate(route, None)?;

        let mut current_amount = amount_in.clone();
        let mut operations = Vec::with_capacity(route.len());

        for (index, hop) in route.iter().enumerate() {
            if current_amount > *hop.reserve_in() {
                tracing::trace!(
                    hop_index = index,
                    pool = hop.address(),
                    input_amount = %current_amount,
                    reserve_in = %hop.reserve_in(),
                    "Hop input exceeds reserve; route unviable"
                );
                return Ok(Trade::empty());
            }

            let fee_bps = self.fees.fee_bps(hop.pool_type());
            let amount_out = swap_output(&current_amount, hop.reserve_in(), hop.reserve_out(), fee_bps)
                .map_err(|error| log_arithmetic_fault(error, route))?;

            if amount_out.is_zero() {
                tracing::trace!(
                    hop_index = index,
                    pool = hop.address(),
                    input_amount = %current_amount,
                    "Hop yields zero output; route unviable"
                );
                return Ok(Trade::empty());
            }

            tracing::trace!(
                hop_index = index,
                pool = hop.address(),
                input_amount = %current_amount,
                output_amount = %amount_out,
                fee_bps = fee_bps,
                "Hop priced"
            );

            operations.push(TradeOperation::new(hop.clone(), fee_bps, current_amount, amount_out.clone()));
            current_amount = amount_out;
        }

        Ok(Trade(operations))
    }

    /// Solve the route backward for a fixed output amount.
    ///
    /// The inverse formula is applied from the last hop to the first to find the
    /// minimal first-hop input. That input is then priced forward so every hop's
    /// output is exactly what the pool would deliver; the final output is therefore
    /// at least `amount_out`.
    pub fn build_exact_output(&self, amount_out: &BigUint, route: &RouteCombination) -> Result<Trade> {
        if route.is_empty() {
            return Ok(Trade::empty());
        }
        RouteValidator::validate(route, None)?;

        let mut required = amount_out.clone();

        for (index, hop) in route.iter().enumerate().rev() {
            let fee_bps = self.fees.fee_bps(hop.pool_type());
            let amount_in = swap_input(&required, hop.reserve_in(), hop.reserve_out(), fee_bps)
                .map_err(|error| log_arithmetic_fault(error, route))?;

            match amount_in {
                Some(amount_in) if amount_in <= *hop.reserve_in() => {
                    tracing::trace!(
                        hop_index = index,
                        pool = hop.address(),
                        required_output = %required,
                        required_input = %amount_in,
                        "Hop solved backward"
                    );
                    required = amount_in;
                }
                _ => {
                    tracing::trace!(
                        hop_index = index,
                        pool = hop.address(),
                        required_output = %required,
                        "Hop cannot deliver required output; route unviable"
                    );
                    return Ok(Trade::empty());
                }
            }
        }

        let trade = self.build_exact_input(&required, route)?;

        if let Some(delivered) = trade.output_amount() {
            if delivered < amount_out {
                let fault = TradeError::InconsistentHop {
                    hop: route.len() - 1,
                    previous_output: delivered.to_string(),
                    input: amount_out.to_string(),
                };
                return Err(log_arithmetic_fault(fault, route).into());
            }
        }

        Ok(trade)
    }
}

fn log_arithmetic_fault(error: TradeError, route: &RouteCombination) -> TradeError {
    tracing::error!(
        error = %error,
        route = %route.describe(),
        "Arithmetic fault while pricing route"
    );
    error
}
