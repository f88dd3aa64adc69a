use std::fmt;

/// Supplier-assigned identifier for a single sailing.
/// Treated as an opaque string; the supplier has used both numeric and
/// alphanumeric forms over time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CruiseId(String);

impl CruiseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CruiseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Local cruise-line identifier.
///
/// The supplier keeps its own line id space; translation between the two
/// goes through [`crate::LineIdMap`]. Raw supplier line ids are plain `u32`
/// so the two spaces cannot be mixed up in signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(u32);

impl LineId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cruise_id_roundtrip() {
        let id = CruiseId::new("2109407");
        assert_eq!(id.as_str(), "2109407");
        assert_eq!(id.to_string(), "2109407");
        assert!(!id.is_empty());
    }

    #[test]
    fn empty_cruise_id_detected() {
        assert!(CruiseId::new("").is_empty());
    }

    #[test]
    fn line_id_display() {
        assert_eq!(LineId::new(15).to_string(), "15");
        assert_eq!(LineId::new(15).get(), 15);
    }
}
