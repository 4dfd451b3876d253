//! Fan-out of per-node fetches.
//!
//! Each node gets its own task. Without a limit every fetch is in flight at
//! once, which is only reasonable for small clusters; `limit` bounds the
//! number of concurrent fetches with a semaphore while keeping one task per
//! node.

use super::{FetchResult, NodeFetcher};
use crate::k8s::NodeSummary;
use crate::NodeScanError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::debug;

/// A dispatched fetch task and the node it was issued for.
#[derive(Debug)]
pub struct InFlight {
    pub node_id: String,
    pub handle: JoinHandle<()>,
}

pub struct Dispatcher {
    fetcher: Arc<dyn NodeFetcher>,
    timeout: Duration,
    limiter: Option<Arc<Semaphore>>,
}

impl Dispatcher {
    pub fn new(fetcher: Arc<dyn NodeFetcher>, timeout: Duration, limit: Option<usize>) -> Self {
        Self {
            fetcher,
            timeout,
            limiter: limit.map(|n| Arc::new(Semaphore::new(n.max(1)))),
        }
    }

    /// Spawn one fetch per node. Returns as soon as every task is spawned;
    /// each task pushes exactly one result onto `results`.
    pub fn dispatch(
        &self,
        nodes: &[NodeSummary],
        results: &mpsc::Sender<FetchResult>,
    ) -> Vec<InFlight> {
        let mut in_flight = Vec::with_capacity(nodes.len());

        for node in nodes {
            let fetcher = self.fetcher.clone();
            let limiter = self.limiter.clone();
            let results = results.clone();
            let timeout = self.timeout;
            let node_id = node.id.clone();

            let handle = tokio::spawn({
                let node_id = node_id.clone();
                async move {
                    let _permit = match limiter {
                        // The semaphore is never closed, so acquire cannot fail.
                        Some(semaphore) => semaphore.acquire_owned().await.ok(),
                        None => None,
                    };

                    let result = fetch_one(fetcher.as_ref(), node_id, timeout).await;

                    if results.send(result).await.is_err() {
                        debug!("Result stream closed before node result was delivered");
                    }
                }
            });

            in_flight.push(InFlight { node_id, handle });
        }

        debug!("Dispatched {} node fetches", in_flight.len());
        in_flight
    }
}

async fn fetch_one(fetcher: &dyn NodeFetcher, node_id: String, timeout: Duration) -> FetchResult {
    debug!("Fetching node {}", node_id);

    let fetched = tokio::time::timeout(timeout, fetcher.info(&node_id)).await;

    match fetched {
        Ok(Ok(node)) => FetchResult::success(node_id, node),
        Ok(Err(e)) => FetchResult::failure(node_id, e),
        Err(_) => {
            let error = NodeScanError::FetchTimeout {
                id: node_id.clone(),
                timeout,
            };
            FetchResult::failure(node_id, error)
        }
    }
}
