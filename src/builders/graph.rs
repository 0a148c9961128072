//! Builder pattern for PoolGraph

use crate::errors::Result;
use crate::graph::{IngestReport, Pool, PoolGraph, PoolRecord, PoolType};
use num_bigint::BigUint;

/// Builder for creating PoolGraph instances with a fluent API
#[derive(Debug, Clone, Default)]
pub struct PoolGraphBuilder {
    pools: Vec<Pool>,
    records: Vec<PoolRecord>,
}

impl PoolGraphBuilder {
    /// Create a new PoolGraphBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a liquidity pool to the graph
    ///
    /// # Arguments
    ///
    /// * `pool_type` - Which pool variant prices and encodes the swap
    /// * `address` - The address of the pool
    /// * `token_a`, `token_b` - The asset slugs the pool pairs
    /// * `reserve_a`, `reserve_b` - Current reserves of each side
    pub fn with_pool(
        mut self,
        pool_type: PoolType,
        address: &str,
        token_a: &str,
        token_b: &str,
        reserve_a: impl Into<BigUint>,
        reserve_b: impl Into<BigUint>,
    ) -> Self {
        self.pools.push(Pool::new(
            pool_type,
            address,
            token_a,
            token_b,
            reserve_a.into(),
            reserve_b.into(),
        ));
        self
    }

    /// Add multiple typed pools to the graph
    pub fn with_pools<I>(mut self, pools: I) -> Self
    where
        I: IntoIterator<Item = Pool>,
    {
        self.pools.extend(pools);
        self
    }

    /// Add a raw feed record; it is validated at build time.
    pub fn with_record(mut self, record: PoolRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Add multiple raw feed records
    pub fn with_records<I>(mut self, records: I) -> Self
    where
        I: IntoIterator<Item = PoolRecord>,
    {
        self.records.extend(records);
        self
    }

    /// Build the PoolGraph, dropping invalid pools and records.
    pub fn build(self) -> PoolGraph {
        self.build_with_report().0
    }

    /// Build the PoolGraph and report what was dropped.
    ///
    /// Typed pools are ingested before raw records.
    pub fn build_with_report(self) -> (PoolGraph, IngestReport) {
        let (typed, record_pools, mut report) = self.split();
        let (graph, typed_report) = PoolGraph::from_pools(typed.into_iter().chain(record_pools));
        report.accepted += typed_report.accepted;
        report.dropped += typed_report.dropped;
        report.duplicates += typed_report.duplicates;
        (graph, report)
    }

    /// Build the PoolGraph, failing on the first invalid pool or record.
    ///
    /// # Errors
    ///
    /// Returns an error if a record is malformed, a pool is degenerate, or an
    /// address appears twice.
    pub fn build_strict(self) -> Result<PoolGraph> {
        let mut graph = PoolGraph::new();
        for pool in self.pools {
            graph.add_pool(pool)?;
        }
        for record in self.records {
            graph.add_pool(Pool::try_from(record)?)?;
        }
        Ok(graph)
    }

    fn split(self) -> (Vec<Pool>, Vec<Pool>, IngestReport) {
        let mut report = IngestReport::default();
        let mut record_pools = Vec::with_capacity(self.records.len());
        for record in self.records {
            match Pool::try_from(record) {
                Ok(pool) => record_pools.push(pool),
                Err(error) => {
                    report.dropped += 1;
                    tracing::debug!(error = %error, "Dropping malformed pool record");
                }
            }
        }
        (self.pools, record_pools, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RawAmount;

    fn record(address: &str, reserve: Option<&str>) -> PoolRecord {
        PoolRecord {
            pool_type: Some("v2_plus".to_string()),
            pool_address: Some(address.to_string()),
            token_a_slug: Some("A".to_string()),
            token_b_slug: Some("B".to_string()),
            reserve_a: reserve.map(|value| RawAmount::Text(value.to_string())),
            reserve_b: Some(RawAmount::Number(500)),
        }
    }

    #[test]
    fn test_build_mixes_pools_and_records() {
        let (graph, report) = PoolGraphBuilder::new()
            .with_pool(PoolType::V2Classic, "0xp1", "A", "B", 100u32, 200u32)
            .with_record(record("0xp2", Some("0x64")))
            .with_record(record("0xp3", None))
            .build_with_report();

        assert_eq!(graph.pool_count(), 2);
        assert_eq!(graph.directed_pools().len(), 4);
        assert_eq!(report.accepted, 2);
        assert_eq!(report.dropped, 1);
    }

    #[test]
    fn test_build_strict_rejects_bad_input() {
        let duplicate = PoolGraphBuilder::new()
            .with_pool(PoolType::V2Classic, "0xp1", "A", "B", 100u32, 200u32)
            .with_pool(PoolType::V2Lite, "0xp1", "B", "C", 100u32, 200u32)
            .build_strict();
        assert!(duplicate.is_err());

        let malformed = PoolGraphBuilder::new().with_record(record("0xp2", None)).build_strict();
        assert!(malformed.is_err());

        let degenerate = PoolGraphBuilder::new()
            .with_pool(PoolType::V2Classic, "0xp1", "A", "B", 0u32, 200u32)
            .build_strict();
        assert!(degenerate.is_err());
    }
}
