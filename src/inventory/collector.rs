//! Sequential consumer of fetch results.
//!
//! The collector is the only owner of the run counters and of the report
//! writer, so neither needs locking. Writes to the report may block, so the
//! collector runs on the blocking pool rather than on a runtime worker.

use super::{FetchResult, InventoryOutcome, InventorySummary};
use crate::config::{FilterPredicate, InventoryConfig, ServiceProbe};
use crate::Result;
use std::io::{self, Write};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A progress line is written every this many processed results.
pub const PROGRESS_INTERVAL: usize = 50;

pub struct Collector<W> {
    out: W,
    filter: FilterPredicate,
    service: ServiceProbe,
    total: usize,
    processed: usize,
    matched: usize,
    failed: usize,
}

impl<W: Write> Collector<W> {
    pub fn new(out: W, config: &InventoryConfig, total: usize) -> Self {
        Self {
            out,
            filter: config.filter,
            service: config.service.clone(),
            total,
            processed: 0,
            matched: 0,
            failed: 0,
        }
    }

    /// Report a single result and advance the progress counter.
    pub fn record(&mut self, result: FetchResult) -> io::Result<()> {
        self.processed += 1;

        match result.outcome {
            Ok(node) => {
                // Match and failure lines both name the node by its listing id.
                if self.filter.matches(&node, &self.service) {
                    self.matched += 1;
                    debug!("Node {} matched (uid {})", result.node_id, node.id);
                    writeln!(
                        self.out,
                        "   {} - {} - {}",
                        node.address, node.name, result.node_id
                    )?;
                } else {
                    debug!("Node {} filtered out", result.node_id);
                }
            }
            Err(e) => {
                self.failed += 1;
                warn!("Failed to query node {}: {}", result.node_id, e);
                writeln!(self.out, "Failed to query node {}", result.node_id)?;
            }
        }

        if self.processed % PROGRESS_INTERVAL == 0 {
            writeln!(self.out, "Processed {}/{}", self.processed, self.total)?;
        }

        Ok(())
    }

    pub fn summary(&self) -> InventorySummary {
        InventorySummary {
            total: self.total,
            processed: self.processed,
            matched: self.matched,
            failed: self.failed,
        }
    }

    /// Flush the report and hand back the writer. Returning from here is the
    /// acknowledgment that all report output has been written through.
    pub fn finish(mut self) -> io::Result<InventoryOutcome<W>> {
        self.out.flush()?;
        Ok(InventoryOutcome {
            summary: self.summary(),
            output: self.out,
        })
    }
}

impl<W: Write + Send + 'static> Collector<W> {
    /// Drain `results` until every sender is gone.
    ///
    /// Blocks the calling thread; run it with `tokio::task::spawn_blocking`.
    pub fn drain(
        mut self,
        mut results: mpsc::Receiver<FetchResult>,
    ) -> Result<InventoryOutcome<W>> {
        while let Some(result) = results.blocking_recv() {
            self.record(result)?;
        }

        debug!(
            "Result stream closed after {}/{} results",
            self.processed, self.total
        );

        Ok(self.finish()?)
    }
}
