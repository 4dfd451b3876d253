use k8s_openapi::api::core::v1::{Node, NodeAddress};
use std::collections::BTreeMap;
use std::fmt;

/// Address types in the order they are preferred for the report.
const ADDRESS_PREFERENCE: [&str; 3] = ["InternalIP", "ExternalIP", "Hostname"];

/// Minimal listing entry for a node, as returned by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSummary {
    pub id: String,
}

impl NodeSummary {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn from_k8s_node(node: &Node) -> Option<Self> {
        node.metadata
            .name
            .as_ref()
            .filter(|name| !name.is_empty())
            .map(|name| Self::new(name.clone()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingEligibility {
    Eligible,
    Ineligible,
}

impl SchedulingEligibility {
    pub fn is_eligible(self) -> bool {
        self == Self::Eligible
    }
}

impl fmt::Display for SchedulingEligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eligible => write!(f, "eligible"),
            Self::Ineligible => write!(f, "ineligible"),
        }
    }
}

/// Full record for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDetail {
    pub id: String,
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub eligibility: SchedulingEligibility,
    pub address: String,
}

impl NodeDetail {
    /// Returns true when `key` is present with a non-empty value.
    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes
            .get(key)
            .map(|value| !value.is_empty())
            .unwrap_or(false)
    }

    pub fn from_k8s_node(node: &Node) -> Self {
        let metadata = &node.metadata;
        let name = metadata.name.clone().unwrap_or_default();

        // Labels take precedence over annotations with the same key.
        let mut attributes = metadata.annotations.clone().unwrap_or_default();
        attributes.extend(metadata.labels.clone().unwrap_or_default());

        let cordoned = node
            .spec
            .as_ref()
            .and_then(|s| s.unschedulable)
            .unwrap_or(false);

        let address = node
            .status
            .as_ref()
            .and_then(|s| s.addresses.as_deref())
            .map(preferred_address)
            .unwrap_or_default();

        Self {
            id: metadata
                .uid
                .clone()
                .filter(|uid| !uid.is_empty())
                .unwrap_or_else(|| name.clone()),
            name,
            attributes,
            eligibility: if cordoned {
                SchedulingEligibility::Ineligible
            } else {
                SchedulingEligibility::Eligible
            },
            address,
        }
    }
}

fn preferred_address(addresses: &[NodeAddress]) -> String {
    ADDRESS_PREFERENCE
        .iter()
        .find_map(|kind| addresses.iter().find(|a| a.type_ == *kind))
        .map(|a| a.address.clone())
        .unwrap_or_default()
}
