//! Depth-limited route discovery.
//!
//! Routes are searched depth by depth, from single-hop routes up to the configured
//! maximum, and the results of every depth are concatenated. Shorter routes never
//! short-circuit longer ones because constant-product pricing can make a longer
//! route better.

use crate::graph::{DirectedPool, PoolGraph};
use crate::path::RouteCombination;
use std::collections::{HashMap, HashSet};

/// Default maximum number of hops in a route.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Enumerates every route between two assets up to a hop limit.
#[derive(Debug, Clone, Copy)]
pub struct RouteEnumerator {
    /// Maximum allowed route length (number of hops)
    max_depth: usize,
}

impl Default for RouteEnumerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

/// Shared state for one enumeration pass.
struct Search<'a> {
    adjacency: HashMap<&'a str, Vec<&'a DirectedPool>>,
    input: &'a str,
    output: &'a str,
    chain: Vec<&'a DirectedPool>,
    used_pools: HashSet<&'a str>,
    results: Vec<RouteCombination>,
}

impl RouteEnumerator {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Find every route from `input` to `output` in a graph snapshot.
    pub fn find_routes_in(&self, graph: &PoolGraph, input: &str, output: &str) -> Vec<RouteCombination> {
        self.find_routes(input, output, graph.directed_pools())
    }

    /// Find every route from `input` to `output` through `directed_pools`.
    ///
    /// Results are ordered by length, then by the order of `directed_pools`, which
    /// makes the output deterministic for a given snapshot. No pool address appears
    /// twice in a route, whichever direction it is traversed in.
    ///
    /// Returns an empty list when the assets are equal, either is empty, or the
    /// hop limit is zero.
    pub fn find_routes(
        &self,
        input: &str,
        output: &str,
        directed_pools: &[DirectedPool],
    ) -> Vec<RouteCombination> {
        if input.is_empty() || output.is_empty() || input == output || self.max_depth == 0 {
            tracing::debug!(
                input = input,
                output = output,
                max_depth = self.max_depth,
                "Skipping route enumeration for degenerate request"
            );
            return Vec::new();
        }

        let mut adjacency: HashMap<&str, Vec<&DirectedPool>> = HashMap::new();
        for pool in directed_pools {
            adjacency.entry(pool.token_in()).or_default().push(pool);
        }

        let mut search = Search {
            adjacency,
            input,
            output,
            chain: Vec::with_capacity(self.max_depth),
            used_pools: HashSet::new(),
            results: Vec::new(),
        };

        for depth in 1..=self.max_depth {
            let found_before = search.results.len();
            search.extend(input, depth);

            tracing::trace!(
                depth = depth,
                routes_found = search.results.len() - found_before,
                "Enumerated routes at depth"
            );
        }

        tracing::debug!(
            input = input,
            output = output,
            max_depth = self.max_depth,
            route_count = search.results.len(),
            "Route enumeration completed"
        );

        search.results
    }
}

impl<'a> Search<'a> {
    /// Extend the current chain from `frontier` with exactly `remaining` more hops.
    fn extend(&mut self, frontier: &'a str, remaining: usize) {
        let candidates = match self.adjacency.get(frontier) {
            Some(candidates) => candidates.clone(),
            None => return,
        };

        for pool in candidates {
            if self.used_pools.contains(pool.address()) {
                continue;
            }
            let next = pool.token_out();

            if remaining == 1 {
                if next == self.output {
                    let route = self
                        .chain
                        .iter()
                        .copied()
                        .chain(std::iter::once(pool))
                        .cloned()
                        .collect();
                    self.results.push(route);
                }
                continue;
            }

            self.used_pools.insert(pool.address());
            self.chain.push(pool);
            self.extend(next, remaining - 1);
            self.chain.pop();
            self.used_pools.remove(pool.address());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::PoolGraphBuilder;
    use crate::amm::FeeSchedule;
    use crate::graph::PoolType;
    use crate::path::{BestTradeSelector, TradeBuilder};
    use num_bigint::BigUint;

    fn pools_of(route: &RouteCombination) -> Vec<&str> {
        route.iter().map(DirectedPool::address).collect()
    }

    #[test]
    fn test_two_hop_route_found_only_at_depth_two() {
        let graph = PoolGraphBuilder::new()
            .with_pool(PoolType::V2Classic, "0xxy", "X", "Y", 1_000u64, 1_000u64)
            .with_pool(PoolType::V2Classic, "0xyz", "Y", "Z", 1_000u64, 1_000u64)
            .build();

        let routes = RouteEnumerator::new(2).find_routes_in(&graph, "X", "Z");
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].len(), 2);
        assert_eq!(routes[0].describe(), "X -> Y -> Z");

        let shallow = RouteEnumerator::new(1).find_routes_in(&graph, "X", "Z");
        assert!(shallow.is_empty());
    }

    #[test]
    fn test_disconnected_assets_yield_no_routes() {
        let graph = PoolGraphBuilder::new()
            .with_pool(PoolType::V2Classic, "0xxy", "X", "Y", 1_000u64, 1_000u64)
            .with_pool(PoolType::V2Classic, "0xab", "A", "B", 1_000u64, 1_000u64)
            .build();

        assert!(RouteEnumerator::new(3).find_routes_in(&graph, "X", "B").is_empty());
        assert!(RouteEnumerator::new(3).find_routes_in(&graph, "X", "missing").is_empty());
    }

    #[test]
    fn test_degenerate_requests() {
        let graph = PoolGraphBuilder::new()
            .with_pool(PoolType::V2Classic, "0xxy", "X", "Y", 1_000u64, 1_000u64)
            .build();

        assert!(RouteEnumerator::new(3).find_routes_in(&graph, "X", "X").is_empty());
        assert!(RouteEnumerator::new(3).find_routes_in(&graph, "", "Y").is_empty());
        assert!(RouteEnumerator::new(0).find_routes_in(&graph, "X", "Y").is_empty());
    }

    #[test]
    fn test_results_are_ordered_by_depth_then_pool_order() {
        let graph = PoolGraphBuilder::new()
            .with_pool(PoolType::V2Classic, "0xxy", "X", "Y", 1_000u64, 1_000u64)
            .with_pool(PoolType::V2Classic, "0xxz", "X", "Z", 1_000u64, 1_000u64)
            .with_pool(PoolType::V2Plus, "0xyz", "Y", "Z", 1_000u64, 1_000u64)
            .with_pool(PoolType::V2Lite, "0xxz2", "X", "Z", 1_000u64, 1_000u64)
            .build();

        let routes = RouteEnumerator::new(3).find_routes_in(&graph, "X", "Z");
        let described: Vec<Vec<&str>> = routes.iter().map(pools_of).collect();

        assert_eq!(
            described,
            vec![
                vec!["0xxz"],
                vec!["0xxz2"],
                vec!["0xxy", "0xyz"],
            ]
        );
    }

    #[test]
    fn test_pool_never_reused_in_either_direction() {
        // Only one pool between X and Y: X -> Y -> X -> ... must not reuse it.
        let graph = PoolGraphBuilder::new()
            .with_pool(PoolType::V2Classic, "0xxy", "X", "Y", 1_000u64, 1_000u64)
            .with_pool(PoolType::V2Classic, "0xyw", "Y", "W", 1_000u64, 1_000u64)
            .with_pool(PoolType::V2Classic, "0xwy", "W", "Y", 1_000u64, 1_000u64)
            .with_pool(PoolType::V2Classic, "0xwz", "W", "Z", 1_000u64, 1_000u64)
            .build();

        let routes = RouteEnumerator::new(3).find_routes_in(&graph, "X", "Z");
        for route in &routes {
            let mut seen = HashSet::new();
            assert!(route.iter().all(|pool| seen.insert(pool.address())));
        }

        let described: Vec<Vec<&str>> = routes.iter().map(pools_of).collect();
        assert_eq!(
            described,
            vec![
                vec!["0xxy", "0xyw", "0xwz"],
                vec!["0xxy", "0xwy", "0xwz"],
            ]
        );
    }

    #[test]
    fn test_routes_may_pass_through_endpoints() {
        let graph = PoolGraphBuilder::new()
            .with_pool(PoolType::V2Classic, "0xxz", "X", "Z", 1_000u64, 1_000u64)
            .with_pool(PoolType::V2Classic, "0xzy", "Z", "Y", 1_000u64, 1_000u64)
            .with_pool(PoolType::V2Classic, "0xyz", "Y", "Z", 1_000u64, 4_000u64)
            .build();

        let routes = RouteEnumerator::new(3).find_routes_in(&graph, "X", "Z");
        let described: Vec<Vec<&str>> = routes.iter().map(pools_of).collect();
        assert_eq!(
            described,
            vec![
                vec!["0xxz"],
                vec!["0xxz", "0xzy", "0xyz"],
                vec!["0xxz", "0xyz", "0xzy"],
            ]
        );

        // Z -> Y -> Z through the deeper Y/Z pool beats the direct hop.
        let selector = BestTradeSelector::new(TradeBuilder::new(FeeSchedule::new()));
        let best = selector.best_exact_input(&BigUint::from(100u32), &routes).unwrap();
        assert_eq!(pools_of(&best.route()), vec!["0xxz", "0xzy", "0xyz"]);
        assert_eq!(best.output_amount(), Some(&BigUint::from(302u32)));
    }

    #[test]
    fn test_enumeration_is_repeatable() {
        let graph = PoolGraphBuilder::new()
            .with_pool(PoolType::V2Classic, "0xxy", "X", "Y", 1_000u64, 1_000u64)
            .with_pool(PoolType::V2Plus, "0xyz", "Y", "Z", 1_000u64, 1_000u64)
            .with_pool(PoolType::V2Lite, "0xxz", "X", "Z", 1_000u64, 1_000u64)
            .with_pool(PoolType::V2Classic, "0xzy", "Z", "Y", 2_000u64, 1_000u64)
            .with_pool(PoolType::V2Classic, "0xyw", "Y", "W", 1_000u64, 1_000u64)
            .with_pool(PoolType::V2Classic, "0xwz", "W", "Z", 1_000u64, 1_000u64)
            .build();
        let enumerator = RouteEnumerator::new(3);

        let first = enumerator.find_routes_in(&graph, "X", "Z");
        let second = enumerator.find_routes_in(&graph, "X", "Z");
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }
}
