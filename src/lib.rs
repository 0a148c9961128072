//! Swap Router Library
//!
//! Multi-hop swap routing across constant-product DEX pools. Given a live set of
//! pools, the library finds every route between two assets up to a hop limit,
//! prices each route exactly with big-integer arithmetic, picks the best trade, and
//! turns it into the ordered on-chain operations an external executor submits as
//! one atomic batch.
//!
//! # Architecture Overview
//!
//! - **`graph`**: Pool snapshots, feed ingestion and staleness tracking
//! - **`amm`**: Constant-product pricing for one hop, forward and inverse
//! - **`path`**: Route enumeration, validation, pricing and best-trade selection
//! - **`fee`**: Routing fee and slippage bounds
//! - **`plan`**: Permission grants, per-pool-type swap encoding and fee transfers
//! - **`quote`**: Quote lifecycle and the last-request-wins engine
//! - **`config`**: Host configuration and routing-fee schedules
//! - **`builders`**: Builder patterns for graphs and engines
//! - **`errors`**: Error taxonomy
//! - **`utils`**: Address, big-integer and basis-point helpers
//!
//! # Core Concepts
//!
//! - **Directed pool**: one trading direction of a pool; every pool yields two
//! - **Route combination**: an ordered chain of directed pools, no pool used twice
//! - **Trade**: a route with a concrete input and output amount on every hop
//! - **Operation**: one call (grant, swap, revoke or fee transfer) for the executor
//!
//! # Thread Safety
//!
//! Pool snapshots are immutable and shared through `Arc`; pricing never takes a
//! lock. `PoolFeed` and `QuoteEngine` are `Send + Sync` and meant to be shared.

pub mod amm;
pub mod builders;
pub mod config;
pub mod errors;
pub mod fee;
pub mod graph;
pub mod path;
pub mod plan;
pub mod quote;
pub mod utils;

// Re-export the main Result type and error enum for convenience
pub use errors::{Result, RouterError};

// Re-export builder patterns for convenience
pub use builders::{PoolGraphBuilder, QuoteEngineBuilder};

pub use config::RouterConfig;
pub use graph::{PoolFeed, PoolGraph};
pub use path::{Trade, TradeMode};
pub use plan::{Operation, OperationPlanner};
pub use quote::{QuoteEngine, QuoteOutcome, QuoteRequest};

// Module-specific result types for better ergonomics
pub type GraphResult<T> = std::result::Result<T, errors::GraphError>;
pub type PathResult<T> = std::result::Result<T, errors::PathError>;
pub type TradeResult<T> = std::result::Result<T, errors::TradeError>;
pub type PlanResult<T> = std::result::Result<T, errors::PlanError>;
pub type UtilityResult<T> = std::result::Result<T, errors::UtilityError>;
