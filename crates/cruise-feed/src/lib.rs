pub mod cache;
pub mod downloader;
pub mod fetch;
pub mod ids;
pub mod line_map;
pub mod orchestrator;
pub mod outcome;
pub mod parser;
pub mod path;
pub mod record;
pub mod retry;
pub mod sailing;
pub mod store;
pub mod summary;
pub mod webhook;

pub use cache::{CacheError, CruiseCache};
pub use downloader::{BulkDownloader, DownloaderConfig};
pub use fetch::{FetchError, FileFetcher};
pub use ids::{CruiseId, LineId};
pub use line_map::LineIdMap;
pub use orchestrator::{SyncOrchestrator, SyncRunError};
pub use outcome::{DownloadOutcome, OutcomeStatus};
pub use parser::{IngestionParser, ParseError};
pub use path::{ParsedSupplierPath, PathParseError, PathResolver, SupplierPath};
pub use record::{CabinPrice, CategoryPrices, IngestedCruiseRecord};
pub use retry::RetryConfig;
pub use sailing::{DownloadTarget, SailingReference};
pub use store::{CruiseStore, StoreError};
pub use summary::{RunWarning, SyncRunSummary, WarnStage};
pub use webhook::{Scope, SupplierEvent, WebhookEventProcessor, parse_path_targets};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
