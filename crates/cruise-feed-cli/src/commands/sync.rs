use anyhow::Result;
use cruise_feed::{Scope, SyncOrchestrator};
use cruise_feed_store::{MemoryCache, SqliteCruiseStore};
use cruise_feed_supplier::HttpSupplierClient;

use crate::commands::print_summary;

/// Run one sync for the scope and report the outcome.
pub async fn run(
    orchestrator: &SyncOrchestrator<HttpSupplierClient, SqliteCruiseStore, MemoryCache>,
    scope: Scope,
) -> Result<()> {
    println!("Syncing {scope}...");

    let summary = orchestrator.run(scope).await?;
    print_summary(&summary);

    Ok(())
}
