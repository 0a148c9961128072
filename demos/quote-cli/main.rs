pub mod cli;

use anyhow::Context;
use itertools::Itertools;
use std::sync::Arc;
use swap_router::errors::Result;
use swap_router::graph::PoolRecord;
use swap_router::plan::{AssetEntry, OperationForStorage, StaticAssetRegistry};
use swap_router::quote::QuoteUpdate;
use swap_router::{QuoteEngineBuilder, QuoteOutcome, RouterConfig};

fn read_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(serde_json::from_str(&raw)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quote_cli=info".parse().context("invalid log directive")?),
        )
        .compact()
        .with_file(false)
        .with_line_number(false)
        .with_target(false)
        .init();

    let args = cli::parse_cli_args()?;
    let config = RouterConfig::from_env()?;

    let records: Vec<PoolRecord> = read_json(&args.pools)?;
    let entries: Vec<AssetEntry> = read_json(&args.registry)?;
    let registry = StaticAssetRegistry::from_entries(entries)?;

    let engine = QuoteEngineBuilder::from_config(&config)
        .with_registry(Arc::new(registry))
        .build()?;

    let report = engine.feed().ingest(records);
    tracing::info!(
        accepted = report.accepted,
        dropped = report.dropped,
        duplicates = report.duplicates,
        "Pool snapshot loaded"
    );

    engine.submit(args.request()?);
    let outcome = match engine.refresh() {
        Some(QuoteUpdate::Ready(outcome)) => outcome,
        Some(QuoteUpdate::Failed { reason, .. }) => {
            return Err(anyhow::anyhow!("quote failed: {}", reason).into());
        }
        Some(QuoteUpdate::Idle) | None => {
            tracing::warn!("No quote produced");
            return Ok(());
        }
    };

    if let QuoteOutcome::NoRoute { reason, .. } = &outcome {
        tracing::warn!(reason = %reason, "No route found");
        return Ok(());
    }

    if let Some(quote) = outcome.quote() {
        tracing::info!(quote = %quote, "Best trade selected");
        println!(
            "{}",
            quote
                .trade
                .iter()
                .map(|hop| format!(
                    "  {} {} -> {} {} via {} ({})",
                    hop.amount_in,
                    hop.token_in(),
                    hop.amount_out,
                    hop.token_out(),
                    hop.pool_address(),
                    hop.pool_type()
                ))
                .join("\n")
        );
    }

    let operations = engine.plan(outcome, args.sender()?)?;
    let stored: Vec<OperationForStorage> = operations.iter().map(|op| op.to_storage()).collect();
    println!("{}", serde_json::to_string_pretty(&stored)?);

    Ok(())
}
