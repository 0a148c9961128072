//! Synchronous quote pipeline over one snapshot.

use super::{NoRouteReason, Quote, QuoteOutcome, QuoteRequest, QuoteState};
use crate::errors::{QuoteError, Result};
use crate::fee::{RoutingFeeCalculator, SlippageTolerance};
use crate::graph::PoolGraph;
use crate::path::{BestTradeSelector, RouteEnumerator, TradeMode, TradeSelector};
use crate::plan::{Operation, OperationPlanner};
use alloy::primitives::Address;
use chrono::Utc;
use num_traits::Zero;

/// Enumerate, price, select and plan one quote.
///
/// The pipeline holds no per-quote state. Every call reads only the snapshot and
/// request it is given, so concurrent callers never observe each other.
#[derive(Debug, Clone)]
pub struct QuotePipeline {
    enumerator: RouteEnumerator,
    selector: BestTradeSelector,
    planner: OperationPlanner,
    treasury: String,
}

fn transition(request_id: u64, from: QuoteState, to: QuoteState) {
    tracing::debug!(request_id = request_id, from = %from, to = %to, "Quote state transition");
}

impl QuotePipeline {
    pub fn new(
        enumerator: RouteEnumerator,
        selector: BestTradeSelector,
        planner: OperationPlanner,
        treasury: impl Into<String>,
    ) -> Self {
        Self { enumerator, selector, planner, treasury: treasury.into() }
    }

    pub fn enumerator(&self) -> &RouteEnumerator {
        &self.enumerator
    }

    pub fn planner(&self) -> &OperationPlanner {
        &self.planner
    }

    /// Price `request` against `graph`.
    ///
    /// `routing_fee_bps` is the fee in force for this quote; `stale` is copied onto
    /// the result so callers can warn before executing.
    ///
    /// # Errors
    ///
    /// Returns `QuoteError::SlippageOutOfRange` for tolerances above 100%, a
    /// `ConfigError` for an invalid routing fee, and `TradeError` when pricing hits
    /// an arithmetic fault. "No route" is an `Ok` outcome.
    pub fn quote(
        &self,
        graph: &PoolGraph,
        request_id: u64,
        request: &QuoteRequest,
        routing_fee_bps: u32,
        stale: bool,
    ) -> Result<QuoteOutcome> {
        let slippage = SlippageTolerance::from_bps(request.slippage_bps)?;
        let fee_calculator = RoutingFeeCalculator::new(routing_fee_bps)?;
        let no_route = |reason: NoRouteReason| {
            tracing::debug!(request_id = request_id, reason = %reason, "No route for quote");
            Ok(QuoteOutcome::NoRoute { request_id, reason })
        };

        if request.amount.is_zero() {
            return no_route(NoRouteReason::ZeroAmount);
        }
        if request.input == request.output {
            return no_route(NoRouteReason::SameAsset);
        }
        if let Some(asset) = [&request.input, &request.output]
            .into_iter()
            .find(|asset| !graph.contains_token(asset))
        {
            return no_route(NoRouteReason::UnknownAsset { asset: asset.clone() });
        }

        transition(request_id, QuoteState::Idle, QuoteState::Enumerating);
        let routes = self.enumerator.find_routes_in(graph, &request.input, &request.output);
        if routes.is_empty() {
            return no_route(NoRouteReason::NoConnectingPools);
        }

        transition(request_id, QuoteState::Enumerating, QuoteState::Pricing);
        let selection = self.selector.select(request.mode, &request.amount, &routes)?;
        if !selection.found_route() {
            return no_route(NoRouteReason::NoViableTrade);
        }

        transition(request_id, QuoteState::Pricing, QuoteState::Selected);
        let trade = selection.trade;
        let user_output = fee_calculator.user_output(&trade);
        let max_input = match request.mode {
            TradeMode::ExactInput => None,
            TradeMode::ExactOutput => trade.input_amount().map(|input| slippage.max_input(input)),
        };
        let bounds = slippage.hop_bounds(&trade, max_input.as_ref())?;
        let settled = bounds.last().map(|bound| bound.min_out.clone()).unwrap_or_default();
        let routing_fee =
            fee_calculator.routing_fee(&trade, &settled, &self.treasury, self.planner.native_asset());
        let min_output = fee_calculator.net_of_fee(&settled);

        let quote = Quote {
            request_id,
            request: request.clone(),
            state: QuoteState::Selected,
            trade,
            candidates: selection.candidates,
            routing_fee,
            user_output,
            min_output,
            max_input,
            bounds,
            stale,
            quoted_at: Utc::now(),
        };

        tracing::debug!(quote = %quote, "Quote selected");

        Ok(QuoteOutcome::Quoted(quote))
    }

    /// Plan a selected quote for `sender`, moving it to `Planned`.
    ///
    /// # Errors
    ///
    /// Returns `QuoteError::NothingToPlan` for a quote without a trade, or any
    /// planner error.
    pub fn plan(&self, quote: &mut Quote, sender: Address) -> Result<Vec<Operation>> {
        if quote.trade.is_empty() {
            return Err(QuoteError::NothingToPlan.into());
        }

        let operations = self.planner.plan_with(&quote.trade, sender, &quote.plan_options())?;
        transition(quote.request_id, quote.state, QuoteState::Planned);
        quote.state = QuoteState::Planned;

        Ok(operations)
    }
}
