//! Core pool graph implementation.
//!
//! This module contains the `PoolGraph` snapshot and the ingestion logic that
//! turns raw feed records into directed pools.

use super::types::{Direction, DirectedPool, Pool, PoolId, PoolRecord, TokenId, TokenNode};
use crate::errors::GraphError;
use crate::GraphResult;
use std::collections::HashMap;
use std::sync::Arc;

/// Summary of one ingestion pass over feed records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Pools accepted into the snapshot
    pub accepted: usize,
    /// Records dropped as malformed or degenerate
    pub dropped: usize,
    /// Records dropped because their address was already present
    pub duplicates: usize,
}

/// An immutable snapshot of routable liquidity.
///
/// The `PoolGraph` represents a network where:
/// - Nodes are asset slugs
/// - Each accepted pool contributes two directed edges, forward then inverted
/// - Directed pools keep the order in which their pools were ingested, which makes
///   route enumeration (and therefore tie-breaking) deterministic
#[derive(Debug, Clone, Default)]
pub struct PoolGraph {
    /// All token nodes in the snapshot
    tokens: Vec<TokenNode>,
    /// Accepted pools in ingestion order
    pools: Vec<Arc<Pool>>,
    /// Directed views, two per pool
    directed: Vec<DirectedPool>,
    /// Mapping from asset slug to token ID for fast lookup
    token_slug_to_id: HashMap<String, TokenId>,
    /// Mapping from pool address to its index in `pools`
    pool_address_to_index: HashMap<String, usize>,
}

impl PoolGraph {
    /// Create a new empty pool graph
    pub fn new() -> Self {
        Self::default()
    }

    // ================================
    // Construction Methods
    // ================================

    /// Build a snapshot from raw feed records.
    ///
    /// Malformed records (missing fields, unknown pool type, unparsable or zero
    /// reserves) are dropped and counted; they never abort the snapshot. Duplicate
    /// addresses keep their first occurrence.
    pub fn from_records<I>(records: I) -> (Self, IngestReport)
    where
        I: IntoIterator<Item = PoolRecord>,
    {
        let mut graph = Self::new();
        let mut report = IngestReport::default();

        for record in records {
            let address = record.pool_address.clone().unwrap_or_default();
            match Pool::try_from(record) {
                Ok(pool) => graph.accept(pool, &mut report),
                Err(error) => {
                    report.dropped += 1;
                    tracing::debug!(
                        pool_address = %address,
                        error = %error,
                        "Dropping malformed pool record"
                    );
                }
            }
        }

        graph.log_ingest(&report);
        (graph, report)
    }

    /// Build a snapshot from already-typed pools, applying the same validation as
    /// [`PoolGraph::from_records`].
    pub fn from_pools<I>(pools: I) -> (Self, IngestReport)
    where
        I: IntoIterator<Item = Pool>,
    {
        let mut graph = Self::new();
        let mut report = IngestReport::default();

        for pool in pools {
            match pool.validate() {
                Ok(()) => graph.accept(pool, &mut report),
                Err(error) => {
                    report.dropped += 1;
                    tracing::debug!(
                        pool_address = %pool.address,
                        error = %error,
                        "Dropping degenerate pool"
                    );
                }
            }
        }

        graph.log_ingest(&report);
        (graph, report)
    }

    /// Add a validated pool in both directions.
    ///
    /// # Returns
    ///
    /// The directed pool IDs, forward first.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool is degenerate or its address is already present.
    pub fn add_pool(&mut self, pool: Pool) -> GraphResult<[PoolId; 2]> {
        pool.validate()?;
        if self.pool_address_to_index.contains_key(&pool.address) {
            return Err(GraphError::DuplicatePool { address: pool.address });
        }

        let token_a = self.add_token(&pool.token_a);
        let token_b = self.add_token(&pool.token_b);

        let pool = Arc::new(pool);
        self.pool_address_to_index.insert(pool.address.clone(), self.pools.len());
        self.pools.push(Arc::clone(&pool));

        let forward = self.add_directed(DirectedPool::new(Arc::clone(&pool), Direction::Forward), token_a);
        let inverted = self.add_directed(DirectedPool::new(pool, Direction::Inverted), token_b);

        Ok([forward, inverted])
    }

    fn accept(&mut self, pool: Pool, report: &mut IngestReport) {
        match self.add_pool(pool) {
            Ok(_) => report.accepted += 1,
            Err(GraphError::DuplicatePool { address }) => {
                report.duplicates += 1;
                tracing::debug!(pool_address = %address, "Ignoring duplicate pool in snapshot");
            }
            Err(error) => {
                report.dropped += 1;
                tracing::debug!(error = %error, "Dropping pool");
            }
        }
    }

    fn add_token(&mut self, slug: &str) -> TokenId {
        if let Some(&existing_id) = self.token_slug_to_id.get(slug) {
            return existing_id;
        }

        let token_id = self.tokens.len();
        self.tokens.push(TokenNode::new(slug.to_string()));
        self.token_slug_to_id.insert(slug.to_string(), token_id);
        token_id
    }

    fn add_directed(&mut self, directed: DirectedPool, token_in: TokenId) -> PoolId {
        let pool_id = self.directed.len();
        self.directed.push(directed);
        self.tokens[token_in].add_outgoing(pool_id);
        pool_id
    }

    fn log_ingest(&self, report: &IngestReport) {
        if report.dropped > 0 {
            tracing::warn!(
                dropped = report.dropped,
                accepted = report.accepted,
                "Some pool records were dropped during ingestion"
            );
        }
        tracing::debug!(
            pool_count = self.pools.len(),
            token_count = self.tokens.len(),
            duplicates = report.duplicates,
            "Pool graph snapshot built"
        );
    }

    // ================================
    // Query Methods
    // ================================

    /// Every directed pool in the snapshot, two per pool, in ingestion order.
    pub fn directed_pools(&self) -> &[DirectedPool] {
        &self.directed
    }

    /// Directed pools whose input is `slug`, in ingestion order.
    pub fn outgoing(&self, slug: &str) -> impl Iterator<Item = &DirectedPool> + '_ {
        self.token_slug_to_id
            .get(slug)
            .map(|&token_id| self.tokens[token_id].outgoing())
            .unwrap_or(&[])
            .iter()
            .map(move |&pool_id| &self.directed[pool_id])
    }

    /// Accepted pools in ingestion order.
    pub fn pools(&self) -> &[Arc<Pool>] {
        &self.pools
    }

    /// Look up a pool by its address.
    pub fn find_pool(&self, address: &str) -> GraphResult<&Arc<Pool>> {
        self.pool_address_to_index
            .get(address)
            .map(|&index| &self.pools[index])
            .ok_or_else(|| GraphError::PoolNotFound { address: address.to_string() })
    }

    /// Find the token ID for an asset slug.
    pub fn find_token_id(&self, slug: &str) -> Option<TokenId> {
        self.token_slug_to_id.get(slug).copied()
    }

    pub fn contains_token(&self, slug: &str) -> bool {
        self.token_slug_to_id.contains_key(slug)
    }

    /// Get the number of tokens in the snapshot.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Get the number of (undirected) pools in the snapshot.
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}
