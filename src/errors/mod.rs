//! Error handling for the swap router.
//!
//! Each major component owns a fine-grained error enum, and `RouterError` wraps
//! them all so callers can propagate with `?` and still match on the origin.
//!
//! # Error Hierarchy
//!
//! - **`GraphError`**: malformed or degenerate pool records (DataError, recoverable:
//!   the offending record is dropped)
//! - **`PathError`**: malformed caller-supplied routes
//! - **`TradeError`**: arithmetic faults while pricing (fatal, never masked)
//! - **`PlanError`**: operation planning and calldata encoding failures
//! - **`QuoteError`**: rejected or superseded quote requests
//! - **`ConfigError`**: invalid host configuration
//! - **`UtilityError`**: conversion helpers
//!
//! "No route" is deliberately absent: an empty trade is a normal result, not an error.
//! Snapshot staleness is a flag on the quote, not an error either.

pub mod config;
pub mod graph;
pub mod path;
pub mod plan;
pub mod quote;
pub mod trade;
pub mod utility;

// Re-export all error types for convenience
pub use config::ConfigError;
pub use graph::GraphError;
pub use path::PathError;
pub use plan::PlanError;
pub use quote::QuoteError;
pub use trade::TradeError;
pub use utility::UtilityError;

/// Main result type for the library
pub type Result<T> = std::result::Result<T, RouterError>;

/// Top-level error enum that encompasses all possible errors in the router.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// A pool record could not be turned into a usable pool.
    #[error("Graph operation failed: {0}")]
    Graph(#[from] GraphError),

    /// A route was disconnected, reused a pool, or exceeded the depth limit.
    #[error("Path operation failed: {0}")]
    Path(#[from] PathError),

    /// Pricing math produced an impossible intermediate.
    #[error("Trade arithmetic failed: {0}")]
    Trade(#[from] TradeError),

    /// A trade could not be converted into on-chain operations.
    #[error("Planning failed: {0}")]
    Plan(#[from] PlanError),

    /// A quote request was rejected or dropped.
    #[error("Quote error: {0}")]
    Quote(#[from] QuoteError),

    /// Host configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error in utility functions or type conversions.
    #[error("Utility error: {0}")]
    Utility(#[from] UtilityError),

    /// JSON serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error for cases not covered by specific error types.
    #[error("Generic error: {0}")]
    Other(#[from] anyhow::Error),
}
