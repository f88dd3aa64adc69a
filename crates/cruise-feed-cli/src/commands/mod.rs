pub mod status;
pub mod sync;
pub mod webhook;

use cruise_feed::SyncRunSummary;

/// Print a finished run's summary to stdout and its per-cruise warnings
/// to stderr.
pub fn print_summary(summary: &SyncRunSummary) {
    for warning in &summary.warnings {
        eprintln!("warning: {warning}");
    }
    println!("{summary}");
}
