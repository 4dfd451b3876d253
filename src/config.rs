//! Startup configuration for an inventory run.
//!
//! Configuration is resolved once, before any node is listed: an optional YAML
//! file supplies the base values and command-line flags override them. The
//! resulting [`InventoryConfig`] is read-only for the rest of the run.

use crate::k8s::NodeDetail;
use crate::{NodeScanError, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::sync::Semaphore;

pub const DEFAULT_SERVICE_NAME: &str = "Consul";
pub const DEFAULT_SERVICE_ATTRIBUTE: &str = "consul.version";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// The two independent predicates a node must satisfy to be reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilterPredicate {
    pub want_service: bool,
    pub want_ineligible: bool,
}

impl FilterPredicate {
    pub fn new(want_service: bool, want_ineligible: bool) -> Self {
        Self {
            want_service,
            want_ineligible,
        }
    }

    pub fn matches(&self, node: &NodeDetail, service: &ServiceProbe) -> bool {
        let has_service = service.is_present(node);
        let is_eligible = node.eligibility.is_eligible();

        self.want_service == has_service && self.want_ineligible == !is_eligible
    }

    /// Report header describing what the filter selects, e.g.
    /// `=> Eligible nodes without Consul:`.
    pub fn header(&self, service: &ServiceProbe) -> String {
        let node_status = if self.want_ineligible {
            "Ineligible"
        } else {
            "Eligible"
        };
        let service_status = if self.want_service { "with" } else { "without" };

        format!("=> {} nodes {} {}:", node_status, service_status, service.name)
    }
}

/// How the secondary service agent is detected on a node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceProbe {
    /// Display name used in the report header.
    pub name: String,
    /// Node attribute whose non-empty value marks the agent as present.
    pub attribute: String,
}

impl ServiceProbe {
    pub fn is_present(&self, node: &NodeDetail) -> bool {
        node.has_attribute(&self.attribute)
    }
}

impl Default for ServiceProbe {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVICE_NAME.to_string(),
            attribute: DEFAULT_SERVICE_ATTRIBUTE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub filter: FilterPredicate,
    pub service: ServiceProbe,
    pub fetch_timeout_secs: u64,
    /// Maximum in-flight fetches. Zero runs one fetch per node at once.
    pub concurrency: usize,
    pub channel_capacity: usize,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            filter: FilterPredicate::default(),
            service: ServiceProbe::default(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            concurrency: 0,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Values given on the command line. `None` and `false` leave the base
/// configuration untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub want_service: bool,
    pub want_ineligible: bool,
    pub service_name: Option<String>,
    pub service_attribute: Option<String>,
    pub fetch_timeout_secs: Option<u64>,
    pub concurrency: Option<usize>,
}

impl InventoryConfig {
    /// Load from a YAML file, or start from defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    NodeScanError::ConfigError(format!(
                        "Failed to read {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Self::from_yaml(&raw)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
            .map_err(|e| NodeScanError::ConfigError(format!("Invalid config file: {}", e)))
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.filter.want_service |= overrides.want_service;
        self.filter.want_ineligible |= overrides.want_ineligible;

        if let Some(name) = overrides.service_name {
            self.service.name = name;
        }
        if let Some(attribute) = overrides.service_attribute {
            self.service.attribute = attribute;
        }
        if let Some(secs) = overrides.fetch_timeout_secs {
            self.fetch_timeout_secs = secs;
        }
        if let Some(limit) = overrides.concurrency {
            self.concurrency = limit;
        }

        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.service.attribute.trim().is_empty() {
            return Err(NodeScanError::ConfigError(
                "service attribute must not be empty".to_string(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(NodeScanError::ConfigError(
                "fetch timeout must be at least one second".to_string(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(NodeScanError::ConfigError(
                "channel capacity must be at least 1".to_string(),
            ));
        }
        // Both values end up as semaphore permits inside tokio.
        if self.channel_capacity > Semaphore::MAX_PERMITS {
            return Err(NodeScanError::ConfigError(format!(
                "channel capacity must not exceed {}",
                Semaphore::MAX_PERMITS
            )));
        }
        if self.concurrency > Semaphore::MAX_PERMITS {
            return Err(NodeScanError::ConfigError(format!(
                "concurrency must not exceed {}",
                Semaphore::MAX_PERMITS
            )));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn concurrency_limit(&self) -> Option<usize> {
        (self.concurrency > 0).then_some(self.concurrency)
    }
}
