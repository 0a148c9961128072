//! Core types for the pool graph.
//!
//! This module contains the fundamental types used throughout the graph system:
//! - Pool types and their default fees
//! - Undirected pools as delivered by the feed
//! - Directed views of a pool used for routing
//! - Raw feed records and their validation

use crate::errors::GraphError;
use crate::GraphResult;
use crate::utils::parse_amount;
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Type alias for token indices within a graph snapshot
pub type TokenId = usize;

/// Type alias for directed pool indices within a graph snapshot
pub type PoolId = usize;

/// The closed set of supported DEX pool variants.
///
/// All variants price with the constant-product formula; they differ in their
/// default fee and in how a swap call is encoded on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolType {
    /// Classic constant-product pair, 0.3% fee.
    V2Classic,
    /// Constant-product pair with a higher 0.35% fee.
    V2Plus,
    /// Low-fee constant-product pair, 0.21% fee.
    V2Lite,
}

impl PoolType {
    /// All supported pool types, in declaration order.
    pub const ALL: [PoolType; 3] = [PoolType::V2Classic, PoolType::V2Plus, PoolType::V2Lite];

    /// Default swap fee in basis points.
    pub fn default_fee_bps(&self) -> u32 {
        match self {
            PoolType::V2Classic => 30,
            PoolType::V2Plus => 35,
            PoolType::V2Lite => 21,
        }
    }

    /// The identifier used in feed records and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolType::V2Classic => "v2_classic",
            PoolType::V2Plus => "v2_plus",
            PoolType::V2Lite => "v2_lite",
        }
    }
}

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoolType {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PoolType::ALL
            .into_iter()
            .find(|pool_type| pool_type.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GraphError::UnknownPoolType { pool_type: s.to_string() })
    }
}

/// Which way a pool is traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// token A in, token B out
    Forward,
    /// token B in, token A out
    Inverted,
}

impl Direction {
    /// Whether the pool's first token is the input.
    pub fn zero_for_one(&self) -> bool {
        matches!(self, Direction::Forward)
    }
}

/// A liquidity pool as reported by the feed.
///
/// Pools are undirected; routing works on [`DirectedPool`] views of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub pool_type: PoolType,
    /// On-chain address, used as the pool's identity
    pub address: String,
    pub token_a: String,
    pub token_b: String,
    pub reserve_a: BigUint,
    pub reserve_b: BigUint,
}

impl Pool {
    /// Create a pool from its parts.
    pub fn new(
        pool_type: PoolType,
        address: impl Into<String>,
        token_a: impl Into<String>,
        token_b: impl Into<String>,
        reserve_a: BigUint,
        reserve_b: BigUint,
    ) -> Self {
        Self {
            pool_type,
            address: address.into(),
            token_a: token_a.into(),
            token_b: token_b.into(),
            reserve_a,
            reserve_b,
        }
    }

    /// Check that the pool can be routed through.
    ///
    /// A pool with a zero reserve on either side, or pairing an asset with itself,
    /// is rejected.
    pub fn validate(&self) -> GraphResult<()> {
        if self.reserve_a.is_zero() || self.reserve_b.is_zero() {
            return Err(GraphError::DegeneratePool { pool: self.address.clone() });
        }
        if self.token_a == self.token_b {
            return Err(GraphError::SelfPairedPool {
                pool: self.address.clone(),
                asset: self.token_a.clone(),
            });
        }
        Ok(())
    }

    /// Whether the pool trades the given asset on either side.
    pub fn contains(&self, asset: &str) -> bool {
        self.token_a == asset || self.token_b == asset
    }
}

/// A pool viewed in one trading direction.
///
/// Both directions of a pool share the same `Arc<Pool>`, so exclusion by identity
/// during route enumeration compares pool addresses, not directions.
#[derive(Clone, PartialEq, Eq)]
pub struct DirectedPool {
    pool: Arc<Pool>,
    direction: Direction,
}

impl DirectedPool {
    pub fn new(pool: Arc<Pool>, direction: Direction) -> Self {
        Self { pool, direction }
    }

    /// View `pool` so that `asset_in` is the input side.
    pub fn from_input(pool: Arc<Pool>, asset_in: &str) -> Option<Self> {
        if pool.token_a == asset_in {
            Some(Self::new(pool, Direction::Forward))
        } else if pool.token_b == asset_in {
            Some(Self::new(pool, Direction::Inverted))
        } else {
            None
        }
    }

    pub fn pool(&self) -> &Arc<Pool> {
        &self.pool
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pool_type(&self) -> PoolType {
        self.pool.pool_type
    }

    pub fn address(&self) -> &str {
        &self.pool.address
    }

    pub fn token_in(&self) -> &str {
        match self.direction {
            Direction::Forward => &self.pool.token_a,
            Direction::Inverted => &self.pool.token_b,
        }
    }

    pub fn token_out(&self) -> &str {
        match self.direction {
            Direction::Forward => &self.pool.token_b,
            Direction::Inverted => &self.pool.token_a,
        }
    }

    pub fn reserve_in(&self) -> &BigUint {
        match self.direction {
            Direction::Forward => &self.pool.reserve_a,
            Direction::Inverted => &self.pool.reserve_b,
        }
    }

    pub fn reserve_out(&self) -> &BigUint {
        match self.direction {
            Direction::Forward => &self.pool.reserve_b,
            Direction::Inverted => &self.pool.reserve_a,
        }
    }

    /// The same pool traversed the other way.
    pub fn reversed(&self) -> Self {
        let direction = match self.direction {
            Direction::Forward => Direction::Inverted,
            Direction::Inverted => Direction::Forward,
        };
        Self::new(Arc::clone(&self.pool), direction)
    }
}

impl fmt::Debug for DirectedPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] {} -> {}",
            self.pool.pool_type,
            self.pool.address,
            self.token_in(),
            self.token_out()
        )
    }
}

/// A reserve value as it may appear in a feed: a string (decimal or hex) or a number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Text(String),
    Number(u64),
}

/// A raw pool entry from the external feed.
///
/// Every field is optional so that a partially-populated record can be reported
/// and dropped instead of failing the whole snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRecord {
    pub pool_type: Option<String>,
    pub pool_address: Option<String>,
    #[serde(rename = "tokenASlug")]
    pub token_a_slug: Option<String>,
    #[serde(rename = "tokenBSlug")]
    pub token_b_slug: Option<String>,
    pub reserve_a: Option<RawAmount>,
    pub reserve_b: Option<RawAmount>,
}

impl TryFrom<PoolRecord> for Pool {
    type Error = GraphError;

    fn try_from(record: PoolRecord) -> Result<Self, Self::Error> {
        let pool_type: PoolType = record
            .pool_type
            .ok_or(GraphError::MissingField { field: "poolType" })?
            .parse()?;
        let address = record.pool_address.ok_or(GraphError::MissingField { field: "poolAddress" })?;
        let token_a = record.token_a_slug.ok_or(GraphError::MissingField { field: "tokenASlug" })?;
        let token_b = record.token_b_slug.ok_or(GraphError::MissingField { field: "tokenBSlug" })?;
        let reserve_a = parse_reserve(&address, record.reserve_a, "reserveA")?;
        let reserve_b = parse_reserve(&address, record.reserve_b, "reserveB")?;

        let pool = Pool::new(pool_type, address, token_a, token_b, reserve_a, reserve_b);
        pool.validate()?;
        Ok(pool)
    }
}

fn parse_reserve(
    pool: &str,
    raw: Option<RawAmount>,
    field: &'static str,
) -> Result<BigUint, GraphError> {
    match raw.ok_or(GraphError::MissingField { field })? {
        RawAmount::Number(value) => Ok(BigUint::from(value)),
        RawAmount::Text(text) => parse_amount(&text).map_err(|_| GraphError::InvalidReserve {
            pool: pool.to_string(),
            value: text,
        }),
    }
}

/// A token node in a graph snapshot.
#[derive(Debug, Clone)]
pub struct TokenNode {
    slug: String,
    /// Directed pools that take this token as input, in snapshot order
    outgoing: Vec<PoolId>,
}

impl TokenNode {
    pub fn new(slug: String) -> Self {
        Self { slug, outgoing: Vec::new() }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Directed pools that start at this token.
    pub fn outgoing(&self) -> &[PoolId] {
        &self.outgoing
    }

    pub(crate) fn add_outgoing(&mut self, pool_id: PoolId) {
        self.outgoing.push(pool_id);
    }
}
