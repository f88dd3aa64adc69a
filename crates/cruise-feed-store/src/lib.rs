pub mod cache;
pub mod schema;
pub mod store;

pub use cache::{MemoryCache, cruise_key, line_key};
pub use store::{LineSyncStatus, SqliteCruiseStore};
