//! Last-request-wins quote engine.
//!
//! The engine keeps exactly one active request. Submitting a new request assigns
//! it the next id; any computation that finishes for an older id is discarded.
//! [`QuoteEngine::run`] recomputes the active request whenever the request
//! changes, the pool feed publishes a snapshot, or the refresh timer fires, and
//! publishes each result on a `watch` channel.

use super::{QuoteOutcome, QuotePipeline, QuoteRequest};
use crate::config::RoutingFeeSchedule;
use crate::errors::{QuoteError, Result, RouterError};
use crate::graph::PoolFeed;
use crate::plan::Operation;
use alloy::primitives::Address;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// The request currently being served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRequest {
    pub id: u64,
    pub request: QuoteRequest,
}

/// Latest published engine result.
#[derive(Debug, Clone)]
pub enum QuoteUpdate {
    /// No request is active
    Idle,
    Ready(QuoteOutcome),
    /// Pricing aborted on an arithmetic or configuration fault
    Failed { request_id: u64, reason: String },
}

impl QuoteUpdate {
    pub fn request_id(&self) -> Option<u64> {
        match self {
            QuoteUpdate::Idle => None,
            QuoteUpdate::Ready(outcome) => Some(outcome.request_id()),
            QuoteUpdate::Failed { request_id, .. } => Some(*request_id),
        }
    }

    pub fn outcome(&self) -> Option<&QuoteOutcome> {
        match self {
            QuoteUpdate::Ready(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// What caused a recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Request,
    Snapshot,
    Timer,
}

pub struct QuoteEngine {
    pipeline: QuotePipeline,
    feed: Arc<PoolFeed>,
    routing_fee: RoutingFeeSchedule,
    refresh_interval: Duration,
    next_id: AtomicU64,
    active: watch::Sender<Option<ActiveRequest>>,
    updates: watch::Sender<QuoteUpdate>,
}

impl QuoteEngine {
    pub fn new(
        pipeline: QuotePipeline,
        feed: Arc<PoolFeed>,
        routing_fee: RoutingFeeSchedule,
        refresh_interval: Duration,
    ) -> Self {
        let (active, _) = watch::channel(None);
        let (updates, _) = watch::channel(QuoteUpdate::Idle);
        Self {
            pipeline,
            feed,
            routing_fee,
            refresh_interval,
            next_id: AtomicU64::new(0),
            active,
            updates,
        }
    }

    pub fn feed(&self) -> &Arc<PoolFeed> {
        &self.feed
    }

    pub fn pipeline(&self) -> &QuotePipeline {
        &self.pipeline
    }

    /// Make `request` the active request, superseding every earlier one.
    pub fn submit(&self, request: QuoteRequest) -> u64 {
        let id = self.issue_id();
        tracing::debug!(
            request_id = id,
            input = %request.input,
            output = %request.output,
            amount = %request.amount,
            mode = ?request.mode,
            "Quote request submitted"
        );
        self.active.send_replace(Some(ActiveRequest { id, request }));
        id
    }

    /// Drop the active request; the engine returns to idle.
    pub fn clear(&self) {
        self.updates.send_modify(|update| {
            self.next_id.fetch_add(1, Ordering::SeqCst);
            *update = QuoteUpdate::Idle;
        });
        self.active.send_replace(None);
    }

    /// Ids are issued under the update channel's lock, so a publish either lands
    /// before the new id exists or sees it and backs off.
    fn issue_id(&self) -> u64 {
        let mut id = 0;
        self.updates.send_if_modified(|_| {
            id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            false
        });
        id
    }

    /// Publish `update` only if `request_id` is still the latest request.
    fn publish_if_current(&self, request_id: u64, update: &QuoteUpdate) -> bool {
        self.updates.send_if_modified(|current| {
            if !self.is_current(request_id) {
                return false;
            }
            *current = update.clone();
            true
        })
    }

    /// Id of the most recently issued request.
    pub fn latest_id(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, request_id: u64) -> bool {
        self.latest_id() == request_id
    }

    pub fn active_request(&self) -> Option<ActiveRequest> {
        self.active.borrow().clone()
    }

    /// Receive every published update.
    pub fn subscribe(&self) -> watch::Receiver<QuoteUpdate> {
        self.updates.subscribe()
    }

    /// Price `request` against the current snapshot.
    ///
    /// Returns `Ok(None)` when `request_id` was superseded while computing; the
    /// result is dropped, never surfaced.
    pub fn compute(&self, request_id: u64, request: &QuoteRequest) -> Result<Option<QuoteOutcome>> {
        let snapshot = self.feed.snapshot();
        let now = Utc::now();
        let stale = self.feed.freshness_at(now).is_stale();
        let routing_fee_bps = self.routing_fee.fee_bps_at(now);

        let outcome = self.pipeline.quote(&snapshot, request_id, request, routing_fee_bps, stale)?;

        if !self.is_current(request_id) {
            tracing::debug!(
                request_id = request_id,
                latest_id = self.latest_id(),
                "Dropping result of superseded request"
            );
            return Ok(None);
        }

        if stale {
            tracing::warn!(request_id = request_id, "Quote priced against a stale snapshot");
        }

        Ok(Some(outcome))
    }

    /// Recompute the active request and publish the result.
    ///
    /// Returns the published update, or `None` when there was nothing to publish.
    pub fn refresh(&self) -> Option<QuoteUpdate> {
        let active = self.active_request()?;

        let update = match self.compute(active.id, &active.request) {
            Ok(Some(outcome)) => QuoteUpdate::Ready(outcome),
            Ok(None) => return None,
            Err(error) => {
                tracing::error!(
                    request_id = active.id,
                    error = %error,
                    "Quote computation aborted"
                );
                QuoteUpdate::Failed { request_id: active.id, reason: error.to_string() }
            }
        };

        if !self.publish_if_current(active.id, &update) {
            tracing::debug!(request_id = active.id, "Superseded before publishing");
            return None;
        }
        Some(update)
    }

    /// Plan `outcome` for `sender` if it still belongs to the latest request.
    ///
    /// # Errors
    ///
    /// Returns `QuoteError::Superseded` for an outdated outcome and
    /// `QuoteError::NothingToPlan` when the outcome has no route.
    pub fn plan(&self, outcome: QuoteOutcome, sender: Address) -> Result<Vec<Operation>> {
        let request_id = outcome.request_id();
        if !self.is_current(request_id) {
            return Err(QuoteError::Superseded { request_id, latest_id: self.latest_id() }.into());
        }

        let mut quote = outcome.into_quote().ok_or(QuoteError::NothingToPlan)?;
        self.pipeline.plan(&mut quote, sender)
    }

    /// Serve the active request until `shutdown` flips to `true` or its sender is
    /// dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let mut requests = self.active.subscribe();
        let mut snapshots = self.feed.subscribe();
        let mut ticker = tokio::time::interval(self.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            refresh_interval_ms = self.refresh_interval.as_millis() as u64,
            "Quote engine started"
        );

        loop {
            let trigger = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                changed = requests.changed() => {
                    changed.map_err(|_| engine_stopped("request channel closed"))?;
                    Trigger::Request
                }
                changed = snapshots.changed() => {
                    changed.map_err(|_| engine_stopped("pool feed closed"))?;
                    Trigger::Snapshot
                }
                _ = ticker.tick() => Trigger::Timer,
            };

            if let Some(update) = self.refresh() {
                tracing::trace!(
                    trigger = ?trigger,
                    request_id = ?update.request_id(),
                    "Quote refreshed"
                );
            }
        }

        tracing::info!("Quote engine stopped");
        Ok(())
    }
}

fn engine_stopped(reason: &str) -> RouterError {
    QuoteError::EngineStopped { reason: reason.to_string() }.into()
}
