use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use cruise_feed::{SyncOrchestrator, WebhookEventProcessor};
use cruise_feed_store::{MemoryCache, SqliteCruiseStore};
use cruise_feed_supplier::HttpSupplierClient;

use crate::commands::print_summary;

/// Process one webhook body from a file or stdin.
///
/// Unknown or malformed events are reported and ignored; this command
/// never fails over them, matching the receiver contract of responding
/// 200 OK regardless of ingestion outcome.
pub async fn run(
    orchestrator: &SyncOrchestrator<HttpSupplierClient, SqliteCruiseStore, MemoryCache>,
    processor: &WebhookEventProcessor,
    file: Option<PathBuf>,
) -> Result<()> {
    let body = read_body(file)?;

    let Some(scope) = processor.handle_json(&body) else {
        println!("Ignored unrecognized webhook event.");
        return Ok(());
    };

    println!("Webhook resolved to {scope}, syncing...");

    let summary = orchestrator.run(scope).await?;
    print_summary(&summary);

    Ok(())
}

fn read_body(file: Option<PathBuf>) -> Result<Vec<u8>> {
    match file {
        Some(path) => std::fs::read(&path)
            .with_context(|| format!("failed to read webhook body from {}", path.display())),
        None => {
            let mut body = Vec::new();
            std::io::stdin()
                .read_to_end(&mut body)
                .context("failed to read webhook body from stdin")?;
            Ok(body)
        }
    }
}
