//! Concurrent node inventory.
//!
//! A run lists every node once, fans out one detail fetch per node, funnels
//! each outcome through a single channel and reports the nodes that pass the
//! configured filter:
//!
//! ```text
//! NodeDirectory::list ─► Dispatcher ─► N × NodeFetcher::info ─► mpsc ─► Collector
//!                                  └──────── CompletionBarrier ────────┘
//! ```
//!
//! Every listed node yields exactly one [`FetchResult`], successful or not,
//! and the run only completes once the collector has seen all of them.

pub mod barrier;
pub mod collector;
pub mod dispatcher;

pub use barrier::CompletionBarrier;
pub use collector::{Collector, PROGRESS_INTERVAL};
pub use dispatcher::{Dispatcher, InFlight};

use crate::config::InventoryConfig;
use crate::k8s::{NodeDetail, NodeSummary};
use crate::Result;
use async_trait::async_trait;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Supplies the full set of node identifiers. Called once per run.
#[async_trait]
pub trait NodeDirectory: Send + Sync {
    async fn list(&self) -> Result<Vec<NodeSummary>>;
}

/// Retrieves the detail record of a single node.
#[async_trait]
pub trait NodeFetcher: Send + Sync {
    async fn info(&self, id: &str) -> Result<NodeDetail>;
}

/// Outcome of one fetch, tagged with the node it was issued for.
#[derive(Debug)]
pub struct FetchResult {
    pub node_id: String,
    pub outcome: Result<NodeDetail>,
}

impl FetchResult {
    pub fn success(node_id: impl Into<String>, node: NodeDetail) -> Self {
        Self {
            node_id: node_id.into(),
            outcome: Ok(node),
        }
    }

    pub fn failure(node_id: impl Into<String>, error: crate::NodeScanError) -> Self {
        Self {
            node_id: node_id.into(),
            outcome: Err(error),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Listing,
    Dispatching,
    Draining,
    Done,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InventorySummary {
    pub total: usize,
    pub processed: usize,
    pub matched: usize,
    pub failed: usize,
}

/// Counters of a finished run together with the (flushed) report writer.
#[derive(Debug)]
pub struct InventoryOutcome<W> {
    pub summary: InventorySummary,
    pub output: W,
}

pub struct Inventory {
    directory: Arc<dyn NodeDirectory>,
    fetcher: Arc<dyn NodeFetcher>,
    config: InventoryConfig,
    phase: Phase,
}

impl Inventory {
    pub fn new(
        directory: Arc<dyn NodeDirectory>,
        fetcher: Arc<dyn NodeFetcher>,
        config: InventoryConfig,
    ) -> Self {
        Self {
            directory,
            fetcher,
            config,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run the whole pipeline, writing the report to `out`.
    ///
    /// A listing failure aborts before any fetch is dispatched. Failed
    /// fetches are reported in-line and never fail the run.
    pub async fn run<W>(&mut self, mut out: W) -> Result<InventoryOutcome<W>>
    where
        W: Write + Send + 'static,
    {
        self.advance(Phase::Listing);
        let nodes = self.directory.list().await?;

        info!("Found {} nodes", nodes.len());
        writeln!(out, "=> Found {} nodes", nodes.len())?;

        if nodes.is_empty() {
            out.flush()?;
            self.advance(Phase::Done);
            return Ok(InventoryOutcome {
                summary: InventorySummary::default(),
                output: out,
            });
        }

        writeln!(out, "{}", self.config.filter.header(&self.config.service))?;
        writeln!(out)?;

        let (results_tx, results_rx) = mpsc::channel(self.config.channel_capacity.max(1));

        let collector = Collector::new(out, &self.config, nodes.len());
        let collecting = tokio::task::spawn_blocking(move || collector.drain(results_rx));

        self.advance(Phase::Dispatching);
        let dispatcher = Dispatcher::new(
            self.fetcher.clone(),
            self.config.fetch_timeout(),
            self.config.concurrency_limit(),
        );
        let in_flight = dispatcher.dispatch(&nodes, &results_tx);

        self.advance(Phase::Draining);
        let outcome = CompletionBarrier::new(results_tx, in_flight)
            .wait(collecting)
            .await?;

        self.advance(Phase::Done);
        Ok(outcome)
    }

    fn advance(&mut self, next: Phase) {
        debug!("Inventory phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}
