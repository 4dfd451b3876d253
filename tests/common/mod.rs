#![allow(dead_code)]

use async_trait::async_trait;
use nodescan::config::InventoryConfig;
use nodescan::inventory::{Inventory, InventorySummary, NodeDirectory, NodeFetcher};
use nodescan::k8s::{NodeDetail, NodeSummary, SchedulingEligibility};
use nodescan::{NodeScanError, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub enum Behavior {
    Found(NodeDetail),
    Missing,
    Hang,
    Panic,
}

/// In-memory cluster standing in for both the node directory and the
/// per-node detail API.
pub struct StubCluster {
    order: Vec<String>,
    behaviors: HashMap<String, Behavior>,
    delays: HashMap<String, Duration>,
    list_error: bool,
    fetches: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl StubCluster {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            behaviors: HashMap::new(),
            delays: HashMap::new(),
            list_error: false,
            fetches: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            list_error: true,
            ..Self::new()
        }
    }

    pub fn with(mut self, id: &str, behavior: Behavior) -> Self {
        self.order.push(id.to_string());
        self.behaviors.insert(id.to_string(), behavior);
        self
    }

    pub fn with_delay(mut self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_string(), delay);
        self
    }

    /// `count` healthy nodes named `node-000`, `node-001`, ...
    pub fn healthy(count: usize) -> Self {
        (0..count).fold(Self::new(), |cluster, i| {
            let id = format!("node-{:03}", i);
            let detail = node(&id, false, true);
            cluster
                .with(&id, Behavior::Found(detail))
                .with_delay(&id, Duration::from_millis((i % 7) as u64))
        })
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeDirectory for StubCluster {
    async fn list(&self) -> Result<Vec<NodeSummary>> {
        if self.list_error {
            return Err(NodeScanError::KubernetesError(
                "Failed to list nodes: connection refused".to_string(),
            ));
        }
        Ok(self.order.iter().map(NodeSummary::new).collect())
    }
}

#[async_trait]
impl NodeFetcher for StubCluster {
    async fn info(&self, id: &str) -> Result<NodeDetail> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(id) {
            tokio::time::sleep(*delay).await;
        }

        let result = match self.behaviors.get(id) {
            Some(Behavior::Found(detail)) => Ok(detail.clone()),
            Some(Behavior::Hang) => {
                tokio::time::sleep(Duration::from_secs(300)).await;
                Err(NodeScanError::KubernetesError("hung".to_string()))
            }
            Some(Behavior::Panic) => panic!("stub fetch panicked for {}", id),
            Some(Behavior::Missing) | None => Err(NodeScanError::NodeNotFound {
                name: id.to_string(),
            }),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

pub fn node(id: &str, has_service: bool, eligible: bool) -> NodeDetail {
    let mut attributes = BTreeMap::new();
    attributes.insert("kubernetes.io/os".to_string(), "linux".to_string());
    if has_service {
        attributes.insert("consul.version".to_string(), "1.17.0".to_string());
    }

    NodeDetail {
        id: id.to_string(),
        name: format!("{}.cluster.local", id),
        attributes,
        eligibility: if eligible {
            SchedulingEligibility::Eligible
        } else {
            SchedulingEligibility::Ineligible
        },
        address: format!("10.0.{}.{}", id.len(), id.bytes().map(u32::from).sum::<u32>() % 250),
    }
}

pub fn match_line(detail: &NodeDetail) -> String {
    format!("   {} - {} - {}", detail.address, detail.name, detail.id)
}

pub fn config(want_service: bool, want_ineligible: bool) -> InventoryConfig {
    let mut config = InventoryConfig::default();
    config.filter.want_service = want_service;
    config.filter.want_ineligible = want_ineligible;
    config
}

pub async fn run(cluster: Arc<StubCluster>, config: InventoryConfig) -> (InventorySummary, String) {
    let mut inventory = Inventory::new(cluster.clone(), cluster, config);
    let outcome = inventory.run(Vec::new()).await.expect("inventory run");
    let text = String::from_utf8(outcome.output).expect("utf8 report");
    (outcome.summary, text)
}

pub fn lines_with<'a>(text: &'a str, prefix: &str) -> Vec<&'a str> {
    text.lines().filter(|l| l.starts_with(prefix)).collect()
}
