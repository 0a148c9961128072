//! Best-trade selection across candidate routes.
//!
//! The `TradeSelector` trait lets hosts swap in their own strategy; the provided
//! [`BestTradeSelector`] maximises output for exact-input quotes and minimises
//! input for exact-output quotes.

use crate::errors::Result;
use crate::path::{RouteCombination, Trade, TradeBuilder, TradeMode};
use num_bigint::BigUint;
use std::cmp::Ordering;
use std::fmt;

/// Outcome of one selection pass.
#[derive(Debug, Clone, Default)]
pub struct SelectionResult {
    /// The winning trade, empty when no candidate was viable
    pub trade: Trade,
    /// Number of routes priced
    pub candidates: usize,
    /// Number of routes that produced a viable trade
    pub viable: usize,
}

impl SelectionResult {
    pub fn found_route(&self) -> bool {
        !self.trade.is_empty()
    }
}

impl fmt::Display for SelectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SelectionResult {{ hops: {}, candidates: {}, viable: {}, input: {:?}, output: {:?} }}",
            self.trade.len(),
            self.candidates,
            self.viable,
            self.trade.input_amount(),
            self.trade.output_amount()
        )
    }
}

/// Strategy for choosing one trade among enumerated routes.
pub trait TradeSelector {
    /// Price every route and return the best trade.
    ///
    /// An empty trade in the result means no route was viable. Errors are reserved
    /// for arithmetic faults.
    fn select(
        &self,
        mode: TradeMode,
        amount: &BigUint,
        routes: &[RouteCombination],
    ) -> Result<SelectionResult>;

    /// Get the name of this selection strategy.
    fn name(&self) -> &'static str {
        "TradeSelector"
    }
}

/// Picks the trade with the most output (exact input) or least input (exact output).
///
/// Ties on the primary key go to the trade with fewer hops; remaining ties keep
/// the route that was enumerated first.
#[derive(Debug, Clone, Default)]
pub struct BestTradeSelector {
    builder: TradeBuilder,
}

impl BestTradeSelector {
    pub fn new(builder: TradeBuilder) -> Self {
        Self { builder }
    }

    pub fn builder(&self) -> &TradeBuilder {
        &self.builder
    }

    /// Best exact-input trade, or an empty trade.
    pub fn best_exact_input(&self, amount_in: &BigUint, routes: &[RouteCombination]) -> Result<Trade> {
        Ok(self.select(TradeMode::ExactInput, amount_in, routes)?.trade)
    }

    /// Best exact-output trade, or an empty trade.
    pub fn best_exact_output(&self, amount_out: &BigUint, routes: &[RouteCombination]) -> Result<Trade> {
        Ok(self.select(TradeMode::ExactOutput, amount_out, routes)?.trade)
    }

    /// Whether `candidate` strictly beats `incumbent`.
    fn is_better(mode: TradeMode, candidate: &Trade, incumbent: &Trade) -> bool {
        let primary = match mode {
            TradeMode::ExactInput => candidate.output_amount().cmp(&incumbent.output_amount()),
            TradeMode::ExactOutput => incumbent.input_amount().cmp(&candidate.input_amount()),
        };

        match primary {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => candidate.len() < incumbent.len(),
        }
    }
}

impl TradeSelector for BestTradeSelector {
    fn select(
        &self,
        mode: TradeMode,
        amount: &BigUint,
        routes: &[RouteCombination],
    ) -> Result<SelectionResult> {
        let mut result = SelectionResult {
            candidates: routes.len(),
            ..SelectionResult::default()
        };

        for route in routes {
            let trade = self.builder.build(mode, amount, route)?;
            if trade.is_empty() {
                continue;
            }
            result.viable += 1;

            if result.trade.is_empty() || Self::is_better(mode, &trade, &result.trade) {
                result.trade = trade;
            }
        }

        tracing::debug!(
            mode = ?mode,
            amount = %amount,
            candidates = result.candidates,
            viable = result.viable,
            best_route = %result.trade.route().describe(),
            "Trade selection completed"
        );

        Ok(result)
    }

    fn name(&self) -> &'static str {
        "BestTradeSelector"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::PoolGraphBuilder;
    use crate::graph::{PoolGraph, PoolType};
    use crate::path::RouteEnumerator;

    fn big(value: u64) -> BigUint {
        BigUint::from(value)
    }

    fn routes(graph: &PoolGraph, input: &str, output: &str) -> Vec<RouteCombination> {
        RouteEnumerator::new(3).find_routes_in(graph, input, output)
    }

    #[test]
    fn test_longer_route_can_win() {
        // Shallow direct pool versus a deep two-hop path.
        let graph = PoolGraphBuilder::new()
            .with_pool(PoolType::V2Classic, "0xdirect", "X", "Z", 1_000u64, 1_000u64)
            .with_pool(PoolType::V2Classic, "0xxy", "X", "Y", 1_000_000u64, 1_000_000u64)
            .with_pool(PoolType::V2Classic, "0xyz", "Y", "Z", 1_000_000u64, 1_000_000u64)
            .build();
        let candidates = routes(&graph, "X", "Z");
        assert_eq!(candidates.len(), 2);

        let selector = BestTradeSelector::default();
        let result = selector.select(TradeMode::ExactInput, &big(500), &candidates).unwrap();

        assert_eq!(result.viable, 2);
        assert_eq!(result.trade.len(), 2);
        assert_eq!(result.trade.route().describe(), "X -> Y -> Z");
    }

    #[test]
    fn test_exact_output_prefers_smallest_input() {
        let graph = PoolGraphBuilder::new()
            .with_pool(PoolType::V2Plus, "0xexpensive", "X", "Y", 1_000_000u64, 1_000_000u64)
            .with_pool(PoolType::V2Lite, "0xcheap", "X", "Y", 1_000_000u64, 1_000_000u64)
            .build();
        let candidates = routes(&graph, "X", "Y");

        let trade = BestTradeSelector::default()
            .best_exact_output(&big(10_000), &candidates)
            .unwrap();
        assert_eq!(trade[0].pool_address(), "0xcheap");
        assert!(trade.output_amount().unwrap() >= &big(10_000));
    }

    #[test]
    fn test_ties_prefer_fewer_hops_then_first_found() {
        let graph = PoolGraphBuilder::new()
            .with_pool(PoolType::V2Classic, "0xfirst", "X", "Y", 1_000_000u64, 1_000_000u64)
            .with_pool(PoolType::V2Classic, "0xsecond", "X", "Y", 1_000_000u64, 1_000_000u64)
            .build();
        let candidates = routes(&graph, "X", "Y");

        let trade = BestTradeSelector::default().best_exact_input(&big(1_000), &candidates).unwrap();
        assert_eq!(trade[0].pool_address(), "0xfirst");

        let candidate = trade.clone();
        let mut longer = trade.clone();
        longer.0.push(trade[0].clone());
        assert!(!BestTradeSelector::is_better(TradeMode::ExactInput, &longer, &candidate));
        assert!(BestTradeSelector::is_better(TradeMode::ExactInput, &candidate, &longer));
    }

    #[test]
    fn test_no_viable_route_is_empty_not_error() {
        let graph = PoolGraphBuilder::new()
            .with_pool(PoolType::V2Classic, "0xxy", "X", "Y", 100u64, 100u64)
            .build();
        let candidates = routes(&graph, "X", "Y");

        let result = BestTradeSelector::default()
            .select(TradeMode::ExactOutput, &big(100), &candidates)
            .unwrap();
        assert!(!result.found_route());
        assert_eq!(result.candidates, 1);
        assert_eq!(result.viable, 0);

        let none = BestTradeSelector::default().best_exact_input(&big(10), &[]).unwrap();
        assert!(none.is_empty());
    }
}
