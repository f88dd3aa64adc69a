use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::{CabinPrice, CategoryPrices, CruiseId, IngestedCruiseRecord, LineIdMap};

/// Why a supplier payload was rejected. A rejection is recorded against
/// the run and the cruise is skipped; it is retried on the next run.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("payload is not valid JSON: {0}")]
    Json(String),

    #[error("payload has no cruise id")]
    MissingCruiseId,

    #[error("payload has no parseable sailing date")]
    MissingSailDate,

    #[error("payload has no price entries")]
    NoPrices,
}

/// Validates and transforms raw supplier JSON into the internal record
/// shape. Field names and number encodings follow the supplier's feed,
/// which mixes numeric and string encodings for the same fields across
/// lines; coercion is lenient, validation of the required fields is not.
#[derive(Debug, Clone)]
pub struct IngestionParser {
    line_map: Arc<LineIdMap>,
}

impl IngestionParser {
    pub fn new(line_map: Arc<LineIdMap>) -> Self {
        Self { line_map }
    }

    pub fn parse(&self, raw: &[u8]) -> Result<IngestedCruiseRecord, ParseError> {
        let payload: SupplierCruise =
            serde_json::from_slice(raw).map_err(|e| ParseError::Json(e.to_string()))?;

        let cruise_id = payload
            .codetocruiseid
            .or(payload.cruiseid)
            .filter(|id| !id.is_empty())
            .map(CruiseId::new)
            .ok_or(ParseError::MissingCruiseId)?;

        let sail_date = payload
            .saildate
            .as_deref()
            .or(payload.startdate.as_deref())
            .and_then(parse_sail_date)
            .ok_or(ParseError::MissingSailDate)?;

        let line_id = self.line_map.invert(payload.lineid.unwrap_or(0));

        let cheapest = CategoryPrices {
            inside: payload.cheapestinside,
            outside: payload.cheapestoutside,
            balcony: payload.cheapestbalcony,
            suite: payload.cheapestsuite,
        };

        let mut cabin_prices = Vec::new();
        for (rate_code, cabins) in &payload.prices {
            for (cabin_code, cabin) in cabins {
                let Some(price) = cabin.price else { continue };
                cabin_prices.push(CabinPrice {
                    rate_code: rate_code.clone(),
                    cabin_code: cabin_code.clone(),
                    price,
                    taxes: cabin.taxes,
                });
            }
        }

        let record = IngestedCruiseRecord {
            cruise_id,
            line_id,
            ship_id: payload.shipid,
            name: payload.name.filter(|n| !n.is_empty()),
            sail_date,
            nights: payload.nights,
            currency: payload.currency.filter(|c| !c.is_empty()),
            cheapest,
            cabin_prices,
        };

        if !record.has_prices() {
            return Err(ParseError::NoPrices);
        }

        Ok(record)
    }
}

/// The supplier publishes `YYYY-MM-DD`, occasionally with a time suffix.
fn parse_sail_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.split(['T', ' ']).next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Wire shape of one per-cruise supplier file. Unknown fields are ignored;
/// the feed carries far more than this pipeline persists.
#[derive(Debug, Deserialize)]
struct SupplierCruise {
    #[serde(default, deserialize_with = "de_opt_string")]
    codetocruiseid: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    cruiseid: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    saildate: Option<String>,
    #[serde(default)]
    startdate: Option<String>,
    #[serde(default, deserialize_with = "de_opt_u32")]
    nights: Option<u32>,
    #[serde(default, deserialize_with = "de_opt_u32")]
    lineid: Option<u32>,
    #[serde(default, deserialize_with = "de_opt_u32")]
    shipid: Option<u32>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default, deserialize_with = "de_opt_price")]
    cheapestinside: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_price")]
    cheapestoutside: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_price")]
    cheapestbalcony: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_price")]
    cheapestsuite: Option<f64>,
    #[serde(default)]
    prices: BTreeMap<String, BTreeMap<String, SupplierCabin>>,
}

#[derive(Debug, Deserialize)]
struct SupplierCabin {
    #[serde(default, deserialize_with = "de_opt_price")]
    price: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_price")]
    taxes: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Num(f64),
    Str(String),
}

/// Number-or-string -> string id. Integral numbers lose the trailing `.0`.
fn de_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Option::<NumberOrString>::deserialize(d)?;
    Ok(value.and_then(|v| match v {
        NumberOrString::Num(n) if n.fract() == 0.0 => Some(format!("{}", n as i64)),
        NumberOrString::Num(n) => Some(n.to_string()),
        NumberOrString::Str(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
    }))
}

fn de_opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    let value = Option::<NumberOrString>::deserialize(d)?;
    Ok(value.and_then(|v| match v {
        NumberOrString::Num(n) if n >= 0.0 && n.fract() == 0.0 => Some(n as u32),
        NumberOrString::Num(_) => None,
        NumberOrString::Str(s) => s.trim().parse().ok(),
    }))
}

/// Prices arrive as numbers, numeric strings, empty strings, or null
/// depending on the line. Anything unparseable collapses to None; the
/// record is rejected only if no price survives at all.
fn de_opt_price<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<NumberOrString>::deserialize(d)?;
    Ok(value.and_then(|v| match v {
        NumberOrString::Num(n) => Some(n),
        NumberOrString::Str(s) => s.trim().parse().ok(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LineId;

    fn parser() -> IngestionParser {
        IngestionParser::new(Arc::new(LineIdMap::empty()))
    }

    fn payload() -> serde_json::Value {
        serde_json::json!({
            "codetocruiseid": "2109407",
            "cruiseid": 88123,
            "name": "7 Night Western Caribbean",
            "saildate": "2025-09-14",
            "nights": 7,
            "lineid": 3,
            "shipid": 12,
            "currency": "USD",
            "cheapestinside": "429.00",
            "cheapestbalcony": 899.0,
            "prices": {
                "BESTFARE": {
                    "4D": { "price": "1299.00", "taxes": "150.00" },
                    "2D": { "price": 1399.0 }
                }
            }
        })
    }

    fn bytes(value: &serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(value).unwrap()
    }

    #[test]
    fn parses_full_payload() {
        let record = parser().parse(&bytes(&payload())).unwrap();

        assert_eq!(record.cruise_id.as_str(), "2109407");
        assert_eq!(record.line_id, LineId::new(3));
        assert_eq!(record.ship_id, Some(12));
        assert_eq!(record.name.as_deref(), Some("7 Night Western Caribbean"));
        assert_eq!(record.sail_date, NaiveDate::from_ymd_opt(2025, 9, 14).unwrap());
        assert_eq!(record.nights, Some(7));
        assert_eq!(record.currency.as_deref(), Some("USD"));
        assert_eq!(record.cheapest.inside, Some(429.0));
        assert_eq!(record.cheapest.balcony, Some(899.0));
        assert!(record.cheapest.outside.is_none());
    }

    #[test]
    fn flattens_rate_grid_into_cabin_prices() {
        let record = parser().parse(&bytes(&payload())).unwrap();

        assert_eq!(record.cabin_prices.len(), 2);
        let cabin = record
            .cabin_prices
            .iter()
            .find(|c| c.cabin_code == "4D")
            .unwrap();
        assert_eq!(cabin.rate_code, "BESTFARE");
        assert_eq!(cabin.price, 1299.0);
        assert_eq!(cabin.taxes, Some(150.0));
    }

    #[test]
    fn inverse_maps_supplier_line_id() {
        let map = LineIdMap::new([(LineId::new(15), 3)]);
        let parser = IngestionParser::new(Arc::new(map));
        let record = parser.parse(&bytes(&payload())).unwrap();
        assert_eq!(record.line_id, LineId::new(15));
    }

    #[test]
    fn falls_back_to_numeric_cruiseid() {
        let mut value = payload();
        value.as_object_mut().unwrap().remove("codetocruiseid");
        let record = parser().parse(&bytes(&value)).unwrap();
        assert_eq!(record.cruise_id.as_str(), "88123");
    }

    #[test]
    fn rejects_missing_cruise_id() {
        let mut value = payload();
        let map = value.as_object_mut().unwrap();
        map.remove("codetocruiseid");
        map.remove("cruiseid");
        assert!(matches!(
            parser().parse(&bytes(&value)),
            Err(ParseError::MissingCruiseId)
        ));
    }

    #[test]
    fn rejects_blank_cruise_id() {
        let mut value = payload();
        let map = value.as_object_mut().unwrap();
        map.insert("codetocruiseid".into(), serde_json::json!("  "));
        map.remove("cruiseid");
        assert!(matches!(
            parser().parse(&bytes(&value)),
            Err(ParseError::MissingCruiseId)
        ));
    }

    #[test]
    fn rejects_missing_sail_date() {
        let mut value = payload();
        value.as_object_mut().unwrap().remove("saildate");
        assert!(matches!(
            parser().parse(&bytes(&value)),
            Err(ParseError::MissingSailDate)
        ));
    }

    #[test]
    fn startdate_is_accepted_as_fallback() {
        let mut value = payload();
        let map = value.as_object_mut().unwrap();
        map.remove("saildate");
        map.insert("startdate".into(), serde_json::json!("2025-10-01T00:00:00"));
        let record = parser().parse(&bytes(&value)).unwrap();
        assert_eq!(record.sail_date, NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
    }

    #[test]
    fn rejects_payload_with_zero_prices() {
        let mut value = payload();
        let map = value.as_object_mut().unwrap();
        map.remove("cheapestinside");
        map.remove("cheapestbalcony");
        map.insert("prices".into(), serde_json::json!({}));
        assert!(matches!(
            parser().parse(&bytes(&value)),
            Err(ParseError::NoPrices)
        ));
    }

    #[test]
    fn unparseable_price_strings_collapse_to_none() {
        let mut value = payload();
        let map = value.as_object_mut().unwrap();
        map.insert("cheapestinside".into(), serde_json::json!("N/A"));
        let record = parser().parse(&bytes(&value)).unwrap();
        assert!(record.cheapest.inside.is_none());
        // the balcony price keeps the record valid
        assert_eq!(record.cheapest.balcony, Some(899.0));
    }

    #[test]
    fn cabins_without_price_are_dropped() {
        let mut value = payload();
        value.as_object_mut().unwrap().insert(
            "prices".into(),
            serde_json::json!({ "BESTFARE": { "4D": { "taxes": "150.00" } } }),
        );
        let record = parser().parse(&bytes(&value)).unwrap();
        assert!(record.cabin_prices.is_empty());
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            parser().parse(b"not json at all"),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let mut value = payload();
        value
            .as_object_mut()
            .unwrap()
            .insert("itinerary".into(), serde_json::json!([{"day": 1}]));
        assert!(parser().parse(&bytes(&value)).is_ok());
    }
}
