//! Utility function errors

use thiserror::Error;

/// Errors that can occur in conversion helpers
#[derive(Debug, Error)]
pub enum UtilityError {
    #[error("Failed to parse address from string '{input}': {source}")]
    AddressParsingFailed {
        input: String,
        #[source]
        source: alloy::primitives::AddressError,
    },

    #[error("BigUint value too large to fit in U256")]
    ValueTooLarge,

    #[error("Invalid integer amount: '{input}'")]
    InvalidAmount { input: String },

    #[error("Invalid percentage '{input}': {reason}")]
    InvalidPercentage { input: String, reason: String },
}
