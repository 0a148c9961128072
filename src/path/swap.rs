//! Priced hop types for trades.
//!
//! # Core Types
//!
//! - **`TradeOperation`**: one directed pool annotated with the amounts it swaps
//! - **`TradeOperationForStorage`**: a lightweight, serializable representation
//!
//! # Swap Direction
//!
//! Direction follows the pool's token order: `zero_for_one == true` means the
//! pool's first token is sold for its second.

use crate::graph::{DirectedPool, PoolType};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single executed hop of a trade.
///
/// `amount_out` is always the constant-product output for `amount_in` against the
/// hop's reserves and the fee in force when the trade was priced.
#[derive(Clone, PartialEq, Eq)]
pub struct TradeOperation {
    /// The directed pool this hop swaps through
    pub pool: DirectedPool,
    /// Fee applied to this hop, in basis points
    pub fee_bps: u32,
    /// The amount of input tokens consumed in this hop
    pub amount_in: BigUint,
    /// The amount of output tokens received from this hop
    pub amount_out: BigUint,
}

impl TradeOperation {
    pub fn new(pool: DirectedPool, fee_bps: u32, amount_in: BigUint, amount_out: BigUint) -> Self {
        Self { pool, fee_bps, amount_in, amount_out }
    }

    /// Get the asset sold in this hop.
    pub fn token_in(&self) -> &str {
        self.pool.token_in()
    }

    /// Get the asset bought in this hop.
    pub fn token_out(&self) -> &str {
        self.pool.token_out()
    }

    pub fn pool_address(&self) -> &str {
        self.pool.address()
    }

    pub fn pool_type(&self) -> PoolType {
        self.pool.pool_type()
    }

    /// Whether the pool's first token is the input.
    pub fn zero_for_one(&self) -> bool {
        self.pool.direction().zero_for_one()
    }

    /// Convert to a serializable record.
    pub fn to_storage(&self) -> TradeOperationForStorage {
        TradeOperationForStorage::from(self)
    }
}

impl fmt::Debug for TradeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TradeOperation")
            .field("pool", &self.pool_address())
            .field("pool_type", &self.pool_type())
            .field("token_in", &self.token_in())
            .field("token_out", &self.token_out())
            .field("fee_bps", &self.fee_bps)
            .field("amount_in", &self.amount_in)
            .field("amount_out", &self.amount_out)
            .finish()
    }
}

/// Storage-friendly representation of a priced hop.
///
/// Amounts are decimal strings so that the record survives JSON consumers that
/// cannot hold 256-bit integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOperationForStorage {
    pub pool_address: String,
    pub pool_type: PoolType,
    pub token_in: String,
    pub token_out: String,
    pub zero_for_one: bool,
    pub fee_bps: u32,
    pub amount_in: String,
    pub amount_out: String,
}

impl From<&TradeOperation> for TradeOperationForStorage {
    fn from(operation: &TradeOperation) -> Self {
        Self {
            pool_address: operation.pool_address().to_string(),
            pool_type: operation.pool_type(),
            token_in: operation.token_in().to_string(),
            token_out: operation.token_out().to_string(),
            zero_for_one: operation.zero_for_one(),
            fee_bps: operation.fee_bps,
            amount_in: operation.amount_in.to_string(),
            amount_out: operation.amount_out.to_string(),
        }
    }
}
