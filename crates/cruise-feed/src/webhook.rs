use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::{
    DownloadTarget, LineId, LineIdMap, SailingReference, SupplierPath,
};

/// Inbound supplier webhook payload.
///
/// The sender is not trusted to only send known event shapes; anything
/// with an unrecognized `event` tag lands on the Unknown arm instead of
/// failing deserialization. Delivery is at-least-once, so handling must
/// be safe to repeat.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event")]
pub enum SupplierEvent {
    /// A whole cruise line's inventory was repriced; re-sync everything
    /// under the mapped local line.
    #[serde(rename = "cruiseline_pricing_updated")]
    CruiselinePricingUpdated {
        lineid: u32,
        #[serde(default)]
        currency: Option<String>,
        #[serde(default)]
        marketid: Option<u32>,
        #[serde(default)]
        timestamp: Option<i64>,
    },

    /// An explicit list of supplier file paths was refreshed.
    #[serde(rename = "cruises_live_pricing_updated")]
    CruisesLivePricingUpdated {
        #[serde(default)]
        currency: Option<String>,
        #[serde(default)]
        marketid: Option<u32>,
        #[serde(default)]
        timestamp: Option<i64>,
        paths: Vec<String>,
    },

    #[serde(other)]
    Unknown,
}

/// The set of cruises a sync run targets.
#[derive(Debug, Clone, PartialEq)]
pub enum Scope {
    /// Every known cruise under one local line.
    Line(LineId),
    /// Exactly these supplier paths, already resolved.
    Paths(Vec<DownloadTarget>),
    /// Cruises sailing within the next `days` days.
    Recent { days: u32 },
}

impl Scope {
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line(line) => write!(f, "line {line}"),
            Self::Paths(targets) => write!(f, "paths ({})", targets.len()),
            Self::Recent { days } => write!(f, "recent window ({days}d)"),
        }
    }
}

/// Resolves supplier webhook events into sync scopes.
#[derive(Debug, Clone)]
pub struct WebhookEventProcessor {
    line_map: Arc<LineIdMap>,
}

impl WebhookEventProcessor {
    pub fn new(line_map: Arc<LineIdMap>) -> Self {
        Self { line_map }
    }

    /// Resolve one event to a scope. Unknown event shapes are logged and
    /// ignored; they must never crash the receiver.
    pub fn handle(&self, event: SupplierEvent) -> Option<Scope> {
        match event {
            SupplierEvent::CruiselinePricingUpdated { lineid, .. } => {
                let local = self.line_map.invert(lineid);
                tracing::info!(
                    supplier_line_id = lineid,
                    line_id = %local,
                    "cruiseline pricing update, scoping to full line"
                );
                Some(Scope::Line(local))
            }
            SupplierEvent::CruisesLivePricingUpdated { paths, .. } => {
                let targets = parse_path_targets(&self.line_map, &paths);
                tracing::info!(
                    given = paths.len(),
                    resolved = targets.len(),
                    "live pricing update, scoping to path list"
                );
                Some(Scope::Paths(targets))
            }
            SupplierEvent::Unknown => {
                tracing::warn!("ignoring unrecognized webhook event");
                None
            }
        }
    }

    /// Deserialize and handle a raw webhook body. A body that is not
    /// valid JSON is treated like an unknown event.
    pub fn handle_json(&self, body: &[u8]) -> Option<Scope> {
        match serde_json::from_slice::<SupplierEvent>(body) {
            Ok(event) => self.handle(event),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring undeserializable webhook body");
                None
            }
        }
    }
}

/// Parse webhook-provided path strings into pinned download targets,
/// skipping malformed entries with a warning. The paths are already
/// resolved, so these targets bypass the path resolver entirely.
pub fn parse_path_targets(line_map: &LineIdMap, paths: &[String]) -> Vec<DownloadTarget> {
    paths
        .iter()
        .filter_map(|raw| match SupplierPath::parse(raw) {
            Ok(parsed) => {
                let sailing = SailingReference {
                    cruise_id: parsed.cruise_id,
                    line_id: line_map.invert(parsed.supplier_line_id),
                    ship_id: Some(parsed.ship_id),
                    year: parsed.year,
                    month: parsed.month,
                };
                Some(DownloadTarget::pinned(sailing, parsed.path))
            }
            Err(e) => {
                tracing::warn!(path = %raw, error = %e, "skipping malformed webhook path");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CruiseId;

    fn processor_with(map: LineIdMap) -> WebhookEventProcessor {
        WebhookEventProcessor::new(Arc::new(map))
    }

    #[test]
    fn line_event_inverse_maps_supplier_id() {
        let processor = processor_with(LineIdMap::new([(LineId::new(22), 15)]));
        let body = br#"{"event":"cruiseline_pricing_updated","lineid":15,"currency":"USD","marketid":1,"timestamp":1755000000}"#;

        let scope = processor.handle_json(body).unwrap();
        assert_eq!(scope, Scope::Line(LineId::new(22)));
    }

    #[test]
    fn line_event_passes_through_unmapped_id() {
        let processor = processor_with(LineIdMap::empty());
        let body = br#"{"event":"cruiseline_pricing_updated","lineid":15}"#;

        let scope = processor.handle_json(body).unwrap();
        assert_eq!(scope, Scope::Line(LineId::new(15)));
    }

    #[test]
    fn path_event_yields_pinned_targets() {
        let processor = processor_with(LineIdMap::empty());
        let body = br#"{
            "event": "cruises_live_pricing_updated",
            "currency": "USD",
            "marketid": 1,
            "timestamp": 1755000000,
            "paths": ["2025/09/3/12/2109407.json", "2025/10/3/14/2110055.json"]
        }"#;

        let Some(Scope::Paths(targets)) = processor.handle_json(body) else {
            panic!("expected a paths scope");
        };

        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].sailing.cruise_id, CruiseId::new("2109407"));
        assert_eq!(
            targets[0].fixed_path.as_ref().unwrap().as_str(),
            "2025/09/3/12/2109407.json"
        );
        assert_eq!(targets[1].sailing.ship_id, Some(14));
    }

    #[test]
    fn malformed_paths_are_skipped_not_fatal() {
        let processor = processor_with(LineIdMap::empty());
        let body = br#"{
            "event": "cruises_live_pricing_updated",
            "paths": ["2025/09/3/12/2109407.json", "not/a/path"]
        }"#;

        let Some(Scope::Paths(targets)) = processor.handle_json(body) else {
            panic!("expected a paths scope");
        };
        assert_eq!(targets.len(), 1);
    }

    #[test]
    fn unknown_event_is_ignored() {
        let processor = processor_with(LineIdMap::empty());
        let body = br#"{"event":"itineraries_updated","lineid":15}"#;
        assert_eq!(processor.handle_json(body), None);
    }

    #[test]
    fn garbage_body_is_ignored() {
        let processor = processor_with(LineIdMap::empty());
        assert_eq!(processor.handle_json(b"<html>bad gateway</html>"), None);
    }

    #[test]
    fn handling_is_repeatable() {
        let processor = processor_with(LineIdMap::empty());
        let body = br#"{"event":"cruiseline_pricing_updated","lineid":7}"#;

        let first = processor.handle_json(body);
        let second = processor.handle_json(body);
        assert_eq!(first, second);
    }

    #[test]
    fn scope_descriptions() {
        assert_eq!(Scope::Line(LineId::new(3)).describe(), "line 3");
        assert_eq!(Scope::Recent { days: 30 }.describe(), "recent window (30d)");
        assert_eq!(Scope::Paths(Vec::new()).describe(), "paths (0)");
    }
}
