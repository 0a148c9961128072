//! Snapshot ownership and feed connection tracking.
//!
//! The `PoolFeed` holds the current [`PoolGraph`] behind an `Arc` in a
//! `tokio::sync::watch` channel. Ingestion replaces the snapshot wholesale;
//! readers take the `Arc` and price against it without locks, so a quote computed
//! against an older snapshot is never affected by a later update.

use super::core::{IngestReport, PoolGraph};
use super::types::{DirectedPool, Pool, PoolRecord};
use chrono::{DateTime, Duration, Utc};
use futures::{Stream, StreamExt};
use std::sync::{Arc, RwLock};
use tokio::sync::watch;

/// Whether the current snapshot can be trusted as live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
}

impl Freshness {
    pub fn is_stale(&self) -> bool {
        matches!(self, Freshness::Stale)
    }
}

/// Connection and update bookkeeping for the feed.
#[derive(Debug, Clone, Default)]
pub struct FeedStatus {
    pub connected: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub last_report: IngestReport,
    /// Number of snapshots ingested since creation
    pub snapshots: u64,
}

/// Owner of the current pool snapshot.
pub struct PoolFeed {
    sender: watch::Sender<Arc<PoolGraph>>,
    status: RwLock<FeedStatus>,
    staleness_threshold: Duration,
}

impl PoolFeed {
    /// Create a feed with an empty snapshot.
    ///
    /// A snapshot older than `staleness_threshold` (or any snapshot while the feed
    /// is disconnected) is reported as stale.
    pub fn new(staleness_threshold: Duration) -> Self {
        let (sender, _) = watch::channel(Arc::new(PoolGraph::new()));
        Self {
            sender,
            status: RwLock::new(FeedStatus::default()),
            staleness_threshold,
        }
    }

    /// Replace the snapshot with one built from raw feed records.
    pub fn ingest(&self, records: Vec<PoolRecord>) -> IngestReport {
        self.ingest_at(records, Utc::now())
    }

    /// Same as [`PoolFeed::ingest`] with an explicit receive time.
    pub fn ingest_at(&self, records: Vec<PoolRecord>, now: DateTime<Utc>) -> IngestReport {
        let (graph, report) = PoolGraph::from_records(records);
        self.publish(graph, report.clone(), now);
        report
    }

    /// Replace the snapshot with one built from typed pools.
    pub fn ingest_pools(&self, pools: Vec<Pool>, now: DateTime<Utc>) -> IngestReport {
        let (graph, report) = PoolGraph::from_pools(pools);
        self.publish(graph, report.clone(), now);
        report
    }

    fn publish(&self, graph: PoolGraph, report: IngestReport, now: DateTime<Utc>) {
        let pool_count = graph.pool_count();

        // subscribers woken by the snapshot must already see the fresh status
        let snapshots = {
            let mut status = self.status.write().unwrap_or_else(|poisoned| poisoned.into_inner());
            status.connected = true;
            status.last_update = Some(now);
            status.last_report = report;
            status.snapshots += 1;
            status.snapshots
        };
        self.sender.send_replace(Arc::new(graph));

        tracing::debug!(
            pool_count = pool_count,
            snapshot = snapshots,
            "Published pool snapshot"
        );
    }

    /// The current snapshot. Cloning the `Arc` is the only cost.
    pub fn snapshot(&self) -> Arc<PoolGraph> {
        Arc::clone(&self.sender.borrow())
    }

    /// The directed pools of the current snapshot.
    pub fn directed_pools(&self) -> Vec<DirectedPool> {
        self.snapshot().directed_pools().to_vec()
    }

    /// Receive a notification whenever a new snapshot is published.
    pub fn subscribe(&self) -> watch::Receiver<Arc<PoolGraph>> {
        self.sender.subscribe()
    }

    pub fn status(&self) -> FeedStatus {
        self.status.read().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    pub fn mark_connected(&self) {
        self.set_connected(true);
    }

    /// Record that the upstream feed dropped. The last snapshot stays usable but
    /// is reported stale until the next ingestion.
    pub fn mark_disconnected(&self) {
        self.set_connected(false);
    }

    fn set_connected(&self, connected: bool) {
        let mut status = self.status.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if status.connected != connected {
            tracing::info!(connected = connected, "Pool feed connection changed");
        }
        status.connected = connected;
    }

    /// Freshness of the current snapshot at `now`.
    pub fn freshness_at(&self, now: DateTime<Utc>) -> Freshness {
        let status = self.status();
        match status.last_update {
            Some(updated) if status.connected && now - updated <= self.staleness_threshold => {
                Freshness::Fresh
            }
            _ => Freshness::Stale,
        }
    }

    pub fn freshness(&self) -> Freshness {
        self.freshness_at(Utc::now())
    }

    /// Ingest every snapshot produced by `stream` until it ends.
    ///
    /// The feed is marked disconnected when the stream terminates.
    pub async fn run_stream<S>(&self, stream: S)
    where
        S: Stream<Item = Vec<PoolRecord>>,
    {
        let mut stream = std::pin::pin!(stream);
        self.mark_connected();

        while let Some(records) = stream.next().await {
            let report = self.ingest(records);
            tracing::trace!(
                accepted = report.accepted,
                dropped = report.dropped,
                "Ingested snapshot from stream"
            );
        }

        tracing::warn!("Pool feed stream ended");
        self.mark_disconnected();
    }
}
