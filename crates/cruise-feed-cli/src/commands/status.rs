use anyhow::Result;
use cruise_feed_store::SqliteCruiseStore;

/// Print per-line last-sync times and the cruise count.
pub fn run(store: &SqliteCruiseStore) -> Result<()> {
    let count = store.cruise_count().map_err(|e| anyhow::anyhow!("{e}"))?;
    println!("{count} cruises in store");

    let statuses = store
        .line_sync_statuses()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    if statuses.is_empty() {
        println!("No lines have been synced yet.");
        return Ok(());
    }

    for status in statuses {
        match status.last_synced_at {
            Some(when) => println!("line {}: last synced {when}", status.line_id),
            None => println!("line {}: never synced", status.line_id),
        }
    }

    Ok(())
}
