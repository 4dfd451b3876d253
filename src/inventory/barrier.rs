use super::{FetchResult, InFlight, InventoryOutcome};
use crate::{NodeScanError, Result};
use futures::future::join_all;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Closes the result stream once every fetch has finished, then waits for the
/// collector to acknowledge that the report is flushed.
pub struct CompletionBarrier {
    results: mpsc::Sender<FetchResult>,
    in_flight: Vec<InFlight>,
}

impl CompletionBarrier {
    pub fn new(results: mpsc::Sender<FetchResult>, in_flight: Vec<InFlight>) -> Self {
        Self { results, in_flight }
    }

    pub async fn wait<W>(
        self,
        collector: JoinHandle<Result<InventoryOutcome<W>>>,
    ) -> Result<InventoryOutcome<W>> {
        let expected = self.in_flight.len();
        let (node_ids, handles): (Vec<String>, Vec<JoinHandle<()>>) = self
            .in_flight
            .into_iter()
            .map(|f| (f.node_id, f.handle))
            .unzip();

        // A task that panicked or was cancelled never sent its result; stand
        // in for it so the collector still sees one result per node.
        for (node_id, joined) in node_ids.into_iter().zip(join_all(handles).await) {
            if let Err(e) = joined {
                warn!("Fetch task for node {} did not complete: {}", node_id, e);
                let error = NodeScanError::TaskFailed(e.to_string());
                let result = FetchResult::failure(node_id, error);
                if self.results.send(result).await.is_err() {
                    debug!("Collector stopped before all results were delivered");
                }
            }
        }

        debug!("All {} fetch tasks joined, closing result stream", expected);
        drop(self.results);

        let outcome = collector
            .await
            .map_err(|e| NodeScanError::TaskFailed(format!("result collector: {}", e)))??;

        if outcome.summary.processed != expected {
            return Err(NodeScanError::IncompleteRun {
                expected,
                observed: outcome.summary.processed,
            });
        }

        Ok(outcome)
    }
}
