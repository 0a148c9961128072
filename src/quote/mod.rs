//! Quote requests, results and lifecycle.
//!
//! One quote moves through `Idle → Enumerating → Pricing → Selected → Planned`.
//! [`QuotePipeline`] runs those stages synchronously against one pool snapshot;
//! [`QuoteEngine`] keeps the latest request, recomputes it on feed updates and on
//! a timer, and drops any result that belongs to a superseded request.

pub mod engine;
pub mod pipeline;

pub use engine::{QuoteEngine, QuoteUpdate};
pub use pipeline::QuotePipeline;

use crate::fee::{HopBound, RoutingFee};
use crate::path::{Trade, TradeMode};
use crate::plan::PlanOptions;
use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub input: String,
    pub output: String,
    /// Input amount for exact-input quotes, desired output for exact-output quotes
    pub amount: BigUint,
    pub mode: TradeMode,
    pub slippage_bps: u32,
}

impl QuoteRequest {
    pub fn exact_input(input: impl Into<String>, output: impl Into<String>, amount: impl Into<BigUint>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            amount: amount.into(),
            mode: TradeMode::ExactInput,
            slippage_bps: 0,
        }
    }

    pub fn exact_output(input: impl Into<String>, output: impl Into<String>, amount: impl Into<BigUint>) -> Self {
        Self {
            mode: TradeMode::ExactOutput,
            ..Self::exact_input(input, output, amount)
        }
    }

    pub fn with_slippage_bps(mut self, slippage_bps: u32) -> Self {
        self.slippage_bps = slippage_bps;
        self
    }
}

/// Lifecycle stage of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteState {
    Idle,
    Enumerating,
    Pricing,
    Selected,
    Planned,
}

impl fmt::Display for QuoteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuoteState::Idle => "idle",
            QuoteState::Enumerating => "enumerating",
            QuoteState::Pricing => "pricing",
            QuoteState::Selected => "selected",
            QuoteState::Planned => "planned",
        };
        f.write_str(name)
    }
}

/// A priced quote holding the winning trade.
#[derive(Debug, Clone)]
pub struct Quote {
    pub request_id: u64,
    pub request: QuoteRequest,
    pub state: QuoteState,
    pub trade: Trade,
    /// Routes enumerated for this request
    pub candidates: usize,
    pub routing_fee: Option<RoutingFee>,
    /// Final output after the routing fee
    pub user_output: BigUint,
    /// Least the user keeps: the final hop's bound net of the routing fee
    pub min_output: BigUint,
    /// Slippage-adjusted upper bound on the input, for exact-output quotes
    pub max_input: Option<BigUint>,
    /// Per-hop spend and minimum output enforced by the plan
    pub bounds: Vec<HopBound>,
    /// Whether the snapshot was stale when the quote was priced
    pub stale: bool,
    pub quoted_at: DateTime<Utc>,
}

impl Quote {
    /// Bounds and fee the planner applies to this quote's trade.
    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            bounds: self.bounds.clone(),
            routing_fee: self.routing_fee.clone(),
        }
    }

    pub fn input_amount(&self) -> Option<&BigUint> {
        self.trade.input_amount()
    }

    pub fn output_amount(&self) -> Option<&BigUint> {
        self.trade.output_amount()
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Quote #{} [{}] {} | in: {:?} | out: {} | min out: {}{}",
            self.request_id,
            self.state,
            self.trade.route().describe(),
            self.trade.input_amount(),
            self.user_output,
            self.min_output,
            if self.stale { " (stale)" } else { "" }
        )
    }
}

/// Why a request produced no trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoRouteReason {
    ZeroAmount,
    SameAsset,
    UnknownAsset { asset: String },
    NoConnectingPools,
    NoViableTrade,
}

impl fmt::Display for NoRouteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoRouteReason::ZeroAmount => f.write_str("amount is zero"),
            NoRouteReason::SameAsset => f.write_str("input and output are the same asset"),
            NoRouteReason::UnknownAsset { asset } => write!(f, "asset {} has no pools", asset),
            NoRouteReason::NoConnectingPools => f.write_str("no route connects the assets"),
            NoRouteReason::NoViableTrade => f.write_str("no route yields a viable trade"),
        }
    }
}

/// Result of running one request through the pipeline.
#[derive(Debug, Clone)]
pub enum QuoteOutcome {
    Quoted(Quote),
    NoRoute { request_id: u64, reason: NoRouteReason },
}

impl QuoteOutcome {
    pub fn request_id(&self) -> u64 {
        match self {
            QuoteOutcome::Quoted(quote) => quote.request_id,
            QuoteOutcome::NoRoute { request_id, .. } => *request_id,
        }
    }

    pub fn quote(&self) -> Option<&Quote> {
        match self {
            QuoteOutcome::Quoted(quote) => Some(quote),
            QuoteOutcome::NoRoute { .. } => None,
        }
    }

    pub fn into_quote(self) -> Option<Quote> {
        match self {
            QuoteOutcome::Quoted(quote) => Some(quote),
            QuoteOutcome::NoRoute { .. } => None,
        }
    }

    pub fn is_no_route(&self) -> bool {
        matches!(self, QuoteOutcome::NoRoute { .. })
    }
}
