//! Pool graph for swap routing.
//!
//! This module models routable liquidity: nodes are asset slugs and every
//! constant-product pool contributes one directed edge per trading direction.
//! Snapshots are immutable; the [`PoolFeed`] swaps them wholesale.

pub mod core;
pub mod feed;
pub mod types;

// Re-export all public types for convenience
pub use self::core::{IngestReport, PoolGraph};
pub use feed::{FeedStatus, Freshness, PoolFeed};
pub use types::{Direction, DirectedPool, Pool, PoolId, PoolRecord, PoolType, RawAmount, TokenId, TokenNode};
