use crate::inventory::{NodeDirectory, NodeFetcher};
use crate::k8s::types::{NodeDetail, NodeSummary};
use crate::{NodeScanError, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Node;
use kube::{Api, Client};
use tracing::{debug, info, warn};

pub struct K8sClient {
    client: Client,
}

impl K8sClient {
    pub async fn try_default() -> Result<Self> {
        debug!("Initializing Kubernetes client");

        let client = Client::try_default().await.map_err(|e| {
            NodeScanError::KubernetesError(format!("Failed to create K8s client: {}", e))
        })?;

        info!("Successfully connected to Kubernetes cluster");

        Ok(Self { client })
    }

    pub fn nodes(&self) -> Api<Node> {
        Api::all(self.client.clone())
    }

    pub async fn get_node(&self, name: &str) -> Result<Node> {
        self.nodes().get(name).await.map_err(|e| match e {
            kube::Error::Api(ref resp) if resp.code == 404 => NodeScanError::NodeNotFound {
                name: name.to_string(),
            },
            other => NodeScanError::KubernetesError(format!(
                "Failed to get node {}: {}",
                name, other
            )),
        })
    }

    pub async fn list_nodes(&self) -> Result<Vec<Node>> {
        let node_list = self
            .nodes()
            .list(&Default::default())
            .await
            .map_err(|e| NodeScanError::KubernetesError(format!("Failed to list nodes: {}", e)))?;

        Ok(node_list.items)
    }
}

#[async_trait]
impl NodeDirectory for K8sClient {
    async fn list(&self) -> Result<Vec<NodeSummary>> {
        let nodes = self.list_nodes().await?;
        let listed = nodes.len();

        let summaries: Vec<NodeSummary> =
            nodes.iter().filter_map(NodeSummary::from_k8s_node).collect();

        if summaries.len() != listed {
            warn!(
                "Skipped {} listed nodes without a name",
                listed - summaries.len()
            );
        }

        Ok(summaries)
    }
}

#[async_trait]
impl NodeFetcher for K8sClient {
    async fn info(&self, id: &str) -> Result<NodeDetail> {
        let node = self.get_node(id).await?;
        Ok(NodeDetail::from_k8s_node(&node))
    }
}
