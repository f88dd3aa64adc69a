pub mod client;

pub use client::{HttpSupplierClient, SupplierClientConfig};
