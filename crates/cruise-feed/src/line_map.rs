use std::collections::BTreeMap;

use crate::LineId;

/// Immutable translation table between local cruise-line ids and the
/// supplier's line id space.
///
/// Loaded once from configuration at startup and passed explicitly to the
/// components that need it. Absent an explicit override the mapping is the
/// identity, so `resolve` is total and never fails; an unmapped id is a
/// valid, expected case.
#[derive(Debug, Clone, Default)]
pub struct LineIdMap {
    /// local line id -> supplier line id. BTreeMap so the inverse lookup
    /// is deterministic when two locals map to the same supplier id.
    overrides: BTreeMap<LineId, u32>,
}

impl LineIdMap {
    pub fn new(overrides: impl IntoIterator<Item = (LineId, u32)>) -> Self {
        Self {
            overrides: overrides.into_iter().collect(),
        }
    }

    /// A map with no overrides: every id passes through unchanged.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Translate a local line id to the supplier's line id.
    ///
    /// Pass-throughs for unmapped ids are logged so drift in the supplier's
    /// id space surfaces in the logs rather than as silent 404s.
    pub fn resolve(&self, local: LineId) -> u32 {
        match self.overrides.get(&local) {
            Some(&supplier) => supplier,
            None => {
                tracing::debug!(line_id = %local, "no supplier line override, passing through");
                local.get()
            }
        }
    }

    /// Translate a supplier line id back to the local id, as carried in
    /// webhook payloads. The lowest local id with a matching override wins;
    /// otherwise the id passes through.
    pub fn invert(&self, supplier: u32) -> LineId {
        self.overrides
            .iter()
            .find(|&(_, &s)| s == supplier)
            .map(|(&local, _)| local)
            .unwrap_or_else(|| LineId::new(supplier))
    }

    pub fn has_override(&self, local: LineId) -> bool {
        self.overrides.contains_key(&local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_uses_override() {
        let map = LineIdMap::new([(LineId::new(15), 3)]);
        assert_eq!(map.resolve(LineId::new(15)), 3);
    }

    #[test]
    fn resolve_passes_through_unmapped_ids() {
        let map = LineIdMap::new([(LineId::new(15), 3)]);
        assert_eq!(map.resolve(LineId::new(42)), 42);
    }

    #[test]
    fn resolve_is_identity_on_empty_map() {
        let map = LineIdMap::empty();
        for id in [1u32, 7, 15, 999] {
            assert_eq!(map.resolve(LineId::new(id)), id);
        }
    }

    #[test]
    fn invert_finds_override() {
        let map = LineIdMap::new([(LineId::new(15), 3)]);
        assert_eq!(map.invert(3), LineId::new(15));
    }

    #[test]
    fn invert_passes_through_unmapped_ids() {
        let map = LineIdMap::new([(LineId::new(15), 3)]);
        assert_eq!(map.invert(8), LineId::new(8));
    }

    #[test]
    fn invert_prefers_lowest_local_id() {
        let map = LineIdMap::new([(LineId::new(20), 3), (LineId::new(15), 3)]);
        assert_eq!(map.invert(3), LineId::new(15));
    }

    #[test]
    fn has_override_reports_explicit_entries_only() {
        let map = LineIdMap::new([(LineId::new(15), 3)]);
        assert!(map.has_override(LineId::new(15)));
        assert!(!map.has_override(LineId::new(3)));
    }
}
