pub mod cli;
pub mod config;
pub mod error;
pub mod inventory;
pub mod k8s;

pub use error::{NodeScanError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
