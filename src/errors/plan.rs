//! Operation planning and calldata encoding errors.

/// Errors that can occur while converting a trade into on-chain operations
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("Cannot plan an empty trade")]
    EmptyTrade,

    #[error("No contract address registered for asset {asset}")]
    MissingAssetContract { asset: String },

    #[error("Amount {amount} for {context} does not fit in 256 bits")]
    AmountOverflow { context: &'static str, amount: String },

    #[error("Plan has {bounds} hop bounds for a {hops}-hop trade")]
    BoundsMismatch { bounds: usize, hops: usize },

    #[error("Routing fee asset {fee_asset} differs from trade output {output_asset}")]
    FeeAssetMismatch { fee_asset: String, output_asset: String },
}
