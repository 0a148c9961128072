//! Arithmetic faults raised while pricing trades.
//!
//! These are never recovered locally. An unviable hop (zero output, input above
//! reserves) is not an error and simply removes the candidate; the variants below
//! signal a broken invariant in the pricing math itself.

/// Errors that can occur while pricing a route
#[derive(Debug, thiserror::Error)]
pub enum TradeError {
    #[error("Arithmetic underflow in {operation}: {lhs} - {rhs}")]
    Underflow { operation: &'static str, lhs: String, rhs: String },

    #[error("Invalid fee: {fee_bps} bps is outside 0..10000")]
    InvalidFee { fee_bps: u32 },

    #[error("Hop {hop} is inconsistent: previous output {previous_output}, input {input}")]
    InconsistentHop { hop: usize, previous_output: String, input: String },
}
