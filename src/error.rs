use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NodeScanError {
    #[error("Kubernetes error: {0}")]
    KubernetesError(String),

    #[error("Node not found: {name}")]
    NodeNotFound { name: String },

    #[error("Timed out after {timeout:?} fetching node {id}")]
    FetchTimeout { id: String, timeout: Duration },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task failed: {0}")]
    TaskFailed(String),

    #[error("Run ended after {observed} of {expected} node results")]
    IncompleteRun { expected: usize, observed: usize },
}

pub type Result<T> = std::result::Result<T, NodeScanError>;
