use crate::cli::Cli;
use crate::config::InventoryConfig;
use crate::inventory::{Inventory, InventorySummary};
use crate::k8s::K8sClient;
use crate::Result;
use std::io;
use std::sync::Arc;
use tracing::info;

pub fn resolve_config(cli: &Cli) -> Result<InventoryConfig> {
    let config = InventoryConfig::load(cli.config.as_deref())?.with_overrides(cli.overrides());
    config.validate()?;
    Ok(config)
}

pub async fn handle_scan(cli: &Cli) -> Result<InventorySummary> {
    let config = resolve_config(cli)?;
    info!(
        "Filtering for want_service={} want_ineligible={} (service attribute {})",
        config.filter.want_service, config.filter.want_ineligible, config.service.attribute
    );

    let client = Arc::new(K8sClient::try_default().await?);
    let mut inventory = Inventory::new(client.clone(), client, config);

    let outcome = inventory.run(io::stdout()).await?;
    let summary = outcome.summary;

    info!(
        "Processed {}/{} nodes: {} matched, {} failed",
        summary.processed, summary.total, summary.matched, summary.failed
    );

    Ok(summary)
}
