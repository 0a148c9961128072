//! Route creation and validation.
//!
//! Routes normally come from the enumerator, but hosts may pin a route by listing
//! pool addresses explicitly. Both kinds go through the same `RouteValidator`
//! before they are priced.

use crate::errors::{PathError, Result};
use crate::graph::{DirectedPool, PoolGraph};
use crate::path::RouteCombination;
use std::collections::HashSet;
use std::sync::Arc;

/// Builder for creating a route from explicit pool addresses.
///
/// Directions are inferred hop by hop: each pool is traversed so that its input
/// is the previous hop's output, starting from the configured input asset.
pub struct RouteBuilder<'a> {
    graph: Option<&'a PoolGraph>,
    input_token: Option<&'a str>,
    pool_addresses: Vec<&'a str>,
    max_depth: Option<usize>,
}

impl<'a> RouteBuilder<'a> {
    /// Create a new route builder.
    pub fn new() -> Self {
        Self {
            graph: None,
            input_token: None,
            pool_addresses: Vec::new(),
            max_depth: None,
        }
    }

    /// Set the graph snapshot to resolve pools from.
    pub fn with_graph(mut self, graph: &'a PoolGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Set the asset sold by the first hop.
    pub fn from_token(mut self, input_token: &'a str) -> Self {
        self.input_token = Some(input_token);
        self
    }

    /// Append a pool to the route.
    pub fn through(mut self, pool_address: &'a str) -> Self {
        self.pool_addresses.push(pool_address);
        self
    }

    /// Reject routes longer than `max_depth` hops.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Build and validate the route.
    pub fn build(self) -> Result<RouteCombination> {
        let graph = self.graph.ok_or_else(|| PathError::InvalidRoute {
            reason: "No graph provided".to_string(),
        })?;
        let input_token = self.input_token.ok_or_else(|| PathError::InvalidRoute {
            reason: "No input token provided".to_string(),
        })?;

        if self.pool_addresses.is_empty() {
            return Err(PathError::EmptyRoute.into());
        }

        let mut frontier = input_token.to_string();
        let mut hops = Vec::with_capacity(self.pool_addresses.len());

        for address in &self.pool_addresses {
            let pool = graph.find_pool(address)?;
            let hop = DirectedPool::from_input(Arc::clone(pool), &frontier).ok_or_else(|| {
                PathError::AssetNotInPool {
                    pool: address.to_string(),
                    asset: frontier.clone(),
                }
            })?;
            frontier = hop.token_out().to_string();
            hops.push(hop);
        }

        let route = RouteCombination(hops);
        RouteValidator::validate(&route, self.max_depth)?;

        tracing::debug!(
            route = %route.describe(),
            pools = ?route.iter().map(DirectedPool::address).collect::<Vec<_>>(),
            "Route created successfully"
        );

        Ok(route)
    }
}

impl<'a> Default for RouteBuilder<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for route connectivity and pool uniqueness.
pub struct RouteValidator;

impl RouteValidator {
    /// Run every structural check on a route.
    pub fn validate(route: &RouteCombination, max_depth: Option<usize>) -> Result<()> {
        if route.is_empty() {
            return Err(PathError::EmptyRoute.into());
        }
        if let Some(max_length) = max_depth {
            if route.len() > max_length {
                return Err(PathError::RouteTooLong {
                    max_length,
                    actual_length: route.len(),
                }
                .into());
            }
        }
        Self::validate_connectivity(route)?;
        Self::validate_unique_pools(route)
    }

    /// Validate that consecutive hops are properly connected.
    ///
    /// Ensures that the output asset of each hop matches the input asset of the
    /// next one.
    pub fn validate_connectivity(route: &RouteCombination) -> Result<()> {
        for (hop, pair) in route.windows(2).enumerate() {
            let previous_output = pair[0].token_out();
            let current_input = pair[1].token_in();

            if previous_output != current_input {
                tracing::debug!(
                    hop = hop + 1,
                    previous_output = previous_output,
                    current_input = current_input,
                    "Route validation failed: tokens not connected"
                );

                return Err(PathError::TokenMismatch {
                    hop: hop + 1,
                    expected: previous_output.to_string(),
                    actual: current_input.to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Validate that no pool is used twice, in either direction.
    pub fn validate_unique_pools(route: &RouteCombination) -> Result<()> {
        let mut seen = HashSet::with_capacity(route.len());
        for hop in route.iter() {
            if !seen.insert(hop.address()) {
                return Err(PathError::PoolReused { pool: hop.address().to_string() }.into());
            }
        }
        Ok(())
    }

    /// Validate that the route connects exactly the requested assets.
    pub fn validate_endpoints(route: &RouteCombination, input: &str, output: &str) -> Result<()> {
        let start = route.input_token().ok_or(PathError::EmptyRoute)?;
        if start != input {
            return Err(PathError::WrongStartAsset {
                expected: input.to_string(),
                actual: start.to_string(),
            }
            .into());
        }

        let end = route.output_token().ok_or(PathError::EmptyRoute)?;
        if end != output {
            return Err(PathError::WrongEndAsset {
                expected: output.to_string(),
                actual: end.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::PoolGraphBuilder;
    use crate::errors::RouterError;
    use crate::graph::PoolType;

    fn graph() -> PoolGraph {
        PoolGraphBuilder::new()
            .with_pool(PoolType::V2Classic, "0xxy", "X", "Y", 1_000u64, 1_000u64)
            .with_pool(PoolType::V2Plus, "0xzy", "Z", "Y", 1_000u64, 1_000u64)
            .with_pool(PoolType::V2Lite, "0xab", "A", "B", 1_000u64, 1_000u64)
            .build()
    }

    #[test]
    fn test_builder_infers_directions() {
        let graph = graph();
        let route = RouteBuilder::new()
            .with_graph(&graph)
            .from_token("X")
            .through("0xxy")
            .through("0xzy")
            .build()
            .unwrap();

        assert_eq!(route.describe(), "X -> Y -> Z");
        assert!(route[0].direction().zero_for_one());
        assert!(!route[1].direction().zero_for_one());
        assert!(RouteValidator::validate_endpoints(&route, "X", "Z").is_ok());
        assert!(RouteValidator::validate_endpoints(&route, "X", "Y").is_err());
    }

    #[test]
    fn test_builder_rejects_disconnected_pool() {
        let graph = graph();
        let result = RouteBuilder::new()
            .with_graph(&graph)
            .from_token("X")
            .through("0xxy")
            .through("0xab")
            .build();

        assert!(matches!(
            result,
            Err(RouterError::Path(PathError::AssetNotInPool { .. }))
        ));
    }

    #[test]
    fn test_builder_rejects_reuse_and_depth() {
        let graph = graph();
        let reused = RouteBuilder::new()
            .with_graph(&graph)
            .from_token("X")
            .through("0xxy")
            .through("0xxy")
            .build();
        assert!(matches!(reused, Err(RouterError::Path(PathError::PoolReused { .. }))));

        let too_long = RouteBuilder::new()
            .with_graph(&graph)
            .from_token("X")
            .through("0xxy")
            .through("0xzy")
            .with_max_depth(1)
            .build();
        assert!(matches!(too_long, Err(RouterError::Path(PathError::RouteTooLong { .. }))));

        let unknown = RouteBuilder::new().with_graph(&graph).from_token("X").through("0xnone").build();
        assert!(matches!(unknown, Err(RouterError::Graph(_))));
    }

    #[test]
    fn test_validator_detects_gap() {
        let graph = graph();
        let pools = graph.directed_pools();
        // X -> Y followed by A -> B
        let route = RouteCombination(vec![pools[0].clone(), pools[4].clone()]);

        assert!(matches!(
            RouteValidator::validate_connectivity(&route),
            Err(RouterError::Path(PathError::TokenMismatch { hop: 1, .. }))
        ));
        assert!(RouteValidator::validate(&RouteCombination::default(), None).is_err());
    }
}
