//! Route and trade types for swap routing.
//!
//! A [`RouteCombination`] is an unpriced chain of directed pools; a [`Trade`] is the
//! same chain with concrete amounts on every hop. The sub-modules cover the rest of
//! the pipeline:
//!
//! - `enumeration`: depth-limited route discovery
//! - `creation`: building and validating explicit routes
//! - `execution`: pricing a route in exact-input or exact-output mode
//! - `selection`: picking the best trade among candidates

pub mod creation;
pub mod enumeration;
pub mod execution;
pub mod selection;
pub mod swap;

// Re-export types for convenience
pub use creation::{RouteBuilder, RouteValidator};
pub use enumeration::{RouteEnumerator, DEFAULT_MAX_DEPTH};
pub use execution::TradeBuilder;
pub use selection::{BestTradeSelector, TradeSelector};
pub use swap::{TradeOperation, TradeOperationForStorage};

use crate::graph::DirectedPool;
use itertools::Itertools;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::{fmt, iter::FromIterator, ops::Deref};

/// Which side of a trade the user fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeMode {
    /// The input amount is fixed; maximise the output.
    ExactInput,
    /// The output amount is fixed; minimise the input.
    ExactOutput,
}

/// An ordered chain of directed pools from one asset to another.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct RouteCombination(pub Vec<DirectedPool>);

impl Deref for RouteCombination {
    type Target = Vec<DirectedPool>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<DirectedPool> for RouteCombination {
    fn from_iter<I: IntoIterator<Item = DirectedPool>>(iter: I) -> Self {
        RouteCombination(iter.into_iter().collect())
    }
}

impl RouteCombination {
    /// Asset sold by the first hop.
    pub fn input_token(&self) -> Option<&str> {
        self.first().map(DirectedPool::token_in)
    }

    /// Asset bought by the last hop.
    pub fn output_token(&self) -> Option<&str> {
        self.last().map(DirectedPool::token_out)
    }

    /// Asset slugs visited by the route, input first.
    pub fn tokens(&self) -> Vec<&str> {
        let mut tokens: Vec<&str> = self.iter().map(DirectedPool::token_in).collect();
        if let Some(output) = self.output_token() {
            tokens.push(output);
        }
        tokens
    }

    /// Human-readable `X -> Y -> Z` form used in logs.
    pub fn describe(&self) -> String {
        self.iter()
            .map(DirectedPool::token_in)
            .chain(self.output_token())
            .join(" -> ")
    }
}

impl fmt::Debug for RouteCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pools: Vec<_> = self.iter().map(DirectedPool::address).collect();

        f.debug_struct("RouteCombination")
            .field("length", &self.len())
            .field("route", &self.describe())
            .field("pools", &pools)
            .finish()
    }
}

/// A fully priced route. An empty trade means no viable route.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Trade(pub Vec<TradeOperation>);

impl Deref for Trade {
    type Target = Vec<TradeOperation>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<TradeOperation> for Trade {
    fn from_iter<I: IntoIterator<Item = TradeOperation>>(iter: I) -> Self {
        Trade(iter.into_iter().collect())
    }
}

impl Trade {
    /// The "no viable trade" value.
    pub fn empty() -> Self {
        Trade(Vec::new())
    }

    /// Amount consumed by the first hop.
    pub fn input_amount(&self) -> Option<&BigUint> {
        self.first().map(|operation| &operation.amount_in)
    }

    /// Amount delivered by the last hop.
    pub fn output_amount(&self) -> Option<&BigUint> {
        self.last().map(|operation| &operation.amount_out)
    }

    pub fn input_token(&self) -> Option<&str> {
        self.first().map(TradeOperation::token_in)
    }

    pub fn output_token(&self) -> Option<&str> {
        self.last().map(TradeOperation::token_out)
    }

    /// The unpriced route this trade was built from.
    pub fn route(&self) -> RouteCombination {
        self.iter().map(|operation| operation.pool.clone()).collect()
    }

    /// Check that each hop's output feeds the next hop's input exactly.
    pub fn is_consistent(&self) -> bool {
        self.windows(2).all(|pair| {
            pair[0].amount_out == pair[1].amount_in && pair[0].token_out() == pair[1].token_in()
        })
    }

    /// Serializable view of every hop.
    pub fn to_storage(&self) -> Vec<TradeOperationForStorage> {
        self.iter().map(TradeOperation::to_storage).collect()
    }
}

impl fmt::Debug for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trade")
            .field("length", &self.len())
            .field("route", &self.route().describe())
            .field("input_amount", &self.input_amount())
            .field("output_amount", &self.output_amount())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::PoolGraphBuilder;
    use crate::graph::PoolType;

    #[test]
    fn test_route_combination_tokens() {
        let graph = PoolGraphBuilder::new()
            .with_pool(PoolType::V2Classic, "0xp1", "X", "Y", 1_000u64, 2_000u64)
            .with_pool(PoolType::V2Classic, "0xp2", "Y", "Z", 1_000u64, 2_000u64)
            .build();

        let route: RouteCombination = vec![
            graph.directed_pools()[0].clone(),
            graph.directed_pools()[2].clone(),
        ]
        .into_iter()
        .collect();

        assert_eq!(route.input_token(), Some("X"));
        assert_eq!(route.output_token(), Some("Z"));
        assert_eq!(route.describe(), "X -> Y -> Z");
        assert_eq!(RouteCombination::default().describe(), "");
    }

    #[test]
    fn test_trade_consistency_and_storage() {
        let graph = PoolGraphBuilder::new()
            .with_pool(PoolType::V2Classic, "0xp1", "X", "Y", 1_000u64, 2_000u64)
            .with_pool(PoolType::V2Lite, "0xp2", "Y", "Z", 1_000u64, 2_000u64)
            .build();
        let pools = graph.directed_pools();

        let trade = Trade(vec![
            TradeOperation::new(pools[0].clone(), 30, BigUint::from(10u32), BigUint::from(19u32)),
            TradeOperation::new(pools[2].clone(), 21, BigUint::from(19u32), BigUint::from(37u32)),
        ]);
        assert!(trade.is_consistent());
        assert_eq!(trade.input_amount(), Some(&BigUint::from(10u32)));
        assert_eq!(trade.output_amount(), Some(&BigUint::from(37u32)));

        let stored = trade.to_storage();
        assert_eq!(stored[1].pool_type, PoolType::V2Lite);
        assert_eq!(stored[1].amount_out, "37");
        let json = serde_json::to_string(&stored).unwrap();
        assert!(json.contains("\"v2_lite\""));

        let broken = Trade(vec![
            TradeOperation::new(pools[0].clone(), 30, BigUint::from(10u32), BigUint::from(19u32)),
            TradeOperation::new(pools[2].clone(), 21, BigUint::from(18u32), BigUint::from(37u32)),
        ]);
        assert!(!broken.is_consistent());
        assert!(Trade::empty().output_amount().is_none());
    }
}
