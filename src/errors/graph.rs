//! Pool snapshot and graph construction errors.

/// Errors that can occur while turning feed records into a pool graph
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Pool record is missing field `{field}`")]
    MissingField { field: &'static str },

    #[error("Unknown pool type: {pool_type}")]
    UnknownPoolType { pool_type: String },

    #[error("Pool {pool} has an unparsable reserve: {value}")]
    InvalidReserve { pool: String, value: String },

    #[error("Pool {pool} is degenerate: zero reserve on at least one side")]
    DegeneratePool { pool: String },

    #[error("Pool {pool} pairs asset {asset} with itself")]
    SelfPairedPool { pool: String, asset: String },

    #[error("Pool with address {address} already exists in the snapshot")]
    DuplicatePool { address: String },

    #[error("Pool not found with address: {address}")]
    PoolNotFound { address: String },

    #[error("Empty graph: no pools available")]
    EmptyGraph,
}
