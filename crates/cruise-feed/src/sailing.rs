use crate::{CruiseId, LineId, SupplierPath};

/// Read-only reference to a sailing, as enumerated from the store.
/// Input to path resolution; constructed per sync attempt and discarded
/// after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SailingReference {
    pub cruise_id: CruiseId,
    pub line_id: LineId,
    /// Absent ship id makes the sailing unresolvable (fatal precondition,
    /// recorded without network I/O).
    pub ship_id: Option<u32>,
    pub year: u16,
    pub month: u8,
}

/// One unit of work for the bulk downloader: a sailing, optionally pinned
/// to a supplier path that arrived in a webhook and bypasses the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub sailing: SailingReference,
    pub fixed_path: Option<SupplierPath>,
}

impl DownloadTarget {
    /// A target whose path will be resolved from the sailing reference.
    pub fn resolve(sailing: SailingReference) -> Self {
        Self {
            sailing,
            fixed_path: None,
        }
    }

    /// A target with a known supplier path (webhook path lists).
    pub fn pinned(sailing: SailingReference, path: SupplierPath) -> Self {
        Self {
            sailing,
            fixed_path: Some(path),
        }
    }
}

impl From<SailingReference> for DownloadTarget {
    fn from(sailing: SailingReference) -> Self {
        Self::resolve(sailing)
    }
}
