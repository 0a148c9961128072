//! Builder patterns for complex object construction.
//!
//! Builders offer a fluent alternative to constructors with many parameters and
//! consume themselves on `build`.
//!
//! # Available Builders
//!
//! - **`PoolGraphBuilder`**: Builds pool graph snapshots from typed pools or raw feed records
//! - **`QuoteEngineBuilder`**: Wires a quote engine from a `RouterConfig` and an asset registry

pub mod engine;
pub mod graph;

// Re-export builders for convenience
pub use engine::QuoteEngineBuilder;
pub use graph::PoolGraphBuilder;
