use std::fmt;
use std::sync::Arc;

use crate::{CruiseId, LineIdMap, SailingReference};

/// Relative path to one cruise file on the supplier's server.
///
/// Canonical form: `{year:04}/{month:02}/{supplierLineId}/{shipId}/{cruiseId}.json`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SupplierPath(String);

impl SupplierPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse a supplier-provided path string (webhook path lists) back into
    /// its components. Accepts both zero-padded and unpadded months.
    pub fn parse(raw: &str) -> Result<ParsedSupplierPath, PathParseError> {
        let segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();

        let [year, month, line, ship, file] = segments.as_slice() else {
            return Err(PathParseError::WrongSegmentCount(raw.to_owned()));
        };

        let year: u16 = year
            .parse()
            .map_err(|_| PathParseError::BadSegment(raw.to_owned(), "year"))?;
        if year < 1000 {
            return Err(PathParseError::BadSegment(raw.to_owned(), "year"));
        }

        let month: u8 = month
            .parse()
            .map_err(|_| PathParseError::BadSegment(raw.to_owned(), "month"))?;
        if !(1..=12).contains(&month) {
            return Err(PathParseError::BadSegment(raw.to_owned(), "month"));
        }

        let supplier_line_id: u32 = line
            .parse()
            .map_err(|_| PathParseError::BadSegment(raw.to_owned(), "line id"))?;
        let ship_id: u32 = ship
            .parse()
            .map_err(|_| PathParseError::BadSegment(raw.to_owned(), "ship id"))?;

        let cruise_id = file
            .strip_suffix(".json")
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| PathParseError::BadSegment(raw.to_owned(), "file name"))?;

        Ok(ParsedSupplierPath {
            path: SupplierPath(raw.trim_matches('/').to_owned()),
            year,
            month,
            supplier_line_id,
            ship_id,
            cruise_id: CruiseId::new(cruise_id),
        })
    }
}

impl fmt::Display for SupplierPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Components recovered from a supplier path string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSupplierPath {
    pub path: SupplierPath,
    pub year: u16,
    pub month: u8,
    pub supplier_line_id: u32,
    pub ship_id: u32,
    pub cruise_id: CruiseId,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathParseError {
    #[error("path {0:?} does not have year/month/line/ship/file segments")]
    WrongSegmentCount(String),

    #[error("path {0:?} has an invalid {1} segment")]
    BadSegment(String, &'static str),
}

/// Builds the ordered candidate paths for a sailing.
///
/// The canonical zero-padded form always comes first. The supplier's
/// historical month handling has varied, so an unpadded-month variant is
/// emitted as a lower-priority candidate when it differs; callers fall back
/// to it only after the canonical path comes back NotFound.
#[derive(Debug, Clone)]
pub struct PathResolver {
    line_map: Arc<LineIdMap>,
}

impl PathResolver {
    pub fn new(line_map: Arc<LineIdMap>) -> Self {
        Self { line_map }
    }

    /// Ordered candidate paths, most-likely-correct first.
    ///
    /// Returns an empty list when the reference cannot be resolved at all
    /// (no ship id, or a year/month that cannot form a valid path segment).
    /// An unresolvable reference is not a transient failure; the caller
    /// records it without attempting network I/O.
    pub fn candidate_paths(&self, sailing: &SailingReference) -> Vec<SupplierPath> {
        let Some(ship_id) = sailing.ship_id else {
            return Vec::new();
        };

        if sailing.year < 1000 || !(1..=12).contains(&sailing.month) {
            return Vec::new();
        }

        let supplier_line_id = self.line_map.resolve(sailing.line_id);

        let canonical = SupplierPath(format!(
            "{:04}/{:02}/{}/{}/{}.json",
            sailing.year, sailing.month, supplier_line_id, ship_id, sailing.cruise_id,
        ));

        let mut candidates = vec![canonical];

        if sailing.month < 10 {
            candidates.push(SupplierPath(format!(
                "{:04}/{}/{}/{}/{}.json",
                sailing.year, sailing.month, supplier_line_id, ship_id, sailing.cruise_id,
            )));
        }

        candidates
    }
}
