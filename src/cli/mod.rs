pub mod commands;

use crate::config::ConfigOverrides;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nodescan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "List cluster nodes by service agent presence and scheduling eligibility", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(
        long = "consul",
        visible_alias = "with-service",
        help = "Return nodes that have a working service agent"
    )]
    pub with_service: bool,

    #[arg(long, help = "Return nodes that are ineligible for scheduling")]
    pub ineligible: bool,

    #[arg(long, help = "Service name shown in the report header")]
    pub service_name: Option<String>,

    #[arg(long, help = "Node attribute holding the service agent version")]
    pub service_attribute: Option<String>,

    #[arg(long = "timeout", value_name = "SECS", help = "Per-node fetch timeout in seconds")]
    pub timeout_secs: Option<u64>,

    #[arg(long, value_name = "N", help = "Maximum concurrent node fetches (0 = one per node)")]
    pub concurrency: Option<usize>,

    #[arg(short, long, value_name = "PATH", help = "YAML configuration file")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            want_service: self.with_service,
            want_ineligible: self.ineligible,
            service_name: self.service_name.clone(),
            service_attribute: self.service_attribute.clone(),
            fetch_timeout_secs: self.timeout_secs,
            concurrency: self.concurrency,
        }
    }
}
