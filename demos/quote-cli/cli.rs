use alloy::primitives::Address;
use clap::Parser;
use num_bigint::BigUint;
use std::path::PathBuf;
use swap_router::errors::Result;
use swap_router::utils::{parse_amount, percent_to_bps, string_to_h160};
use swap_router::{QuoteRequest, TradeMode};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Quote a swap against a pool snapshot and print the operation plan", long_about = None)]
pub struct Args {
    #[clap(long, env = "QUOTE_POOLS_FILE", help = "JSON file holding the pool snapshot (array of feed records)")]
    pub pools: PathBuf,

    #[clap(long, env = "QUOTE_REGISTRY_FILE", help = "JSON file holding the asset registry (array of asset entries)")]
    pub registry: PathBuf,

    #[clap(long, help = "Asset slug to sell")]
    pub input: String,

    #[clap(long, help = "Asset slug to buy")]
    pub output: String,

    #[clap(long, help = "Raw integer amount, decimal or 0x hex")]
    pub amount: String,

    #[clap(long, help = "Treat the amount as the desired output instead of the input")]
    pub exact_output: bool,

    #[clap(long, env = "QUOTE_SLIPPAGE_PERCENT", default_value = "0.5", help = "Slippage tolerance in percent")]
    pub slippage: String,

    #[clap(long, env = "QUOTE_SENDER", help = "Address that signs and receives the swap output")]
    pub sender: Option<String>,
}

impl Args {
    /// Quote request described by the arguments
    pub fn request(&self) -> Result<QuoteRequest> {
        let amount: BigUint = parse_amount(&self.amount)?;
        let slippage_bps = percent_to_bps(&self.slippage)?;
        let mode = if self.exact_output { TradeMode::ExactOutput } else { TradeMode::ExactInput };

        Ok(QuoteRequest {
            input: self.input.clone(),
            output: self.output.clone(),
            amount,
            mode,
            slippage_bps,
        })
    }

    pub fn sender(&self) -> Result<Address> {
        self.sender
            .as_deref()
            .map(string_to_h160)
            .transpose()
            .map(|sender| sender.unwrap_or(Address::ZERO))
    }
}

/// Parse and validate command line arguments
pub fn parse_cli_args() -> Result<Args> {
    let args = Args::parse();

    let request = args.request()?;
    args.sender()?;

    tracing::debug!(
        input = %args.input,
        output = %args.output,
        amount = %request.amount,
        mode = ?request.mode,
        slippage_bps = request.slippage_bps,
        "Command line arguments parsed"
    );

    Ok(args)
}
