//! Quote request errors.

/// Errors that can occur while validating or running a quote request
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("Slippage tolerance {slippage_bps} bps exceeds 10000")]
    SlippageOutOfRange { slippage_bps: u32 },

    #[error("Quote request {request_id} was superseded by {latest_id}")]
    Superseded { request_id: u64, latest_id: u64 },

    #[error("Quote has no trade to plan")]
    NothingToPlan,

    #[error("Quote engine stopped: {reason}")]
    EngineStopped { reason: String },
}
