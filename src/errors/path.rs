//! Route enumeration and validation errors.

/// Errors that can occur while building or validating route combinations
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("Empty route: no pools available")]
    EmptyRoute,

    #[error("Route too long: maximum length is {max_length}, got {actual_length}")]
    RouteTooLong { max_length: usize, actual_length: usize },

    #[error("Token mismatch in route at hop {hop}: expected {expected}, got {actual}")]
    TokenMismatch { hop: usize, expected: String, actual: String },

    #[error("Pool {pool} appears more than once in the route")]
    PoolReused { pool: String },

    #[error("Route starts at {actual}, expected {expected}")]
    WrongStartAsset { expected: String, actual: String },

    #[error("Route ends at {actual}, expected {expected}")]
    WrongEndAsset { expected: String, actual: String },

    #[error("Pool {pool} does not trade asset {asset}")]
    AssetNotInPool { pool: String, asset: String },

    #[error("Invalid route: {reason}")]
    InvalidRoute { reason: String },
}
