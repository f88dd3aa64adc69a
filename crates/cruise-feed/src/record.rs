use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{CruiseId, LineId};

/// Cheapest available fare per cabin category, as published by the
/// supplier alongside the full rate grid.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryPrices {
    pub inside: Option<f64>,
    pub outside: Option<f64>,
    pub balcony: Option<f64>,
    pub suite: Option<f64>,
}

impl CategoryPrices {
    pub fn is_empty(&self) -> bool {
        self.inside.is_none()
            && self.outside.is_none()
            && self.balcony.is_none()
            && self.suite.is_none()
    }
}

/// One priced cabin under a rate code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CabinPrice {
    pub rate_code: String,
    pub cabin_code: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxes: Option<f64>,
}

/// A validated supplier payload mapped onto the internal cruise/pricing
/// schema. Every persisted record has a non-empty cruise id and at least
/// one price entry.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedCruiseRecord {
    pub cruise_id: CruiseId,
    /// Local line id, after inverse mapping from the supplier's id.
    pub line_id: LineId,
    pub ship_id: Option<u32>,
    pub name: Option<String>,
    pub sail_date: NaiveDate,
    pub nights: Option<u32>,
    pub currency: Option<String>,
    pub cheapest: CategoryPrices,
    pub cabin_prices: Vec<CabinPrice>,
}

impl IngestedCruiseRecord {
    /// True when the record carries at least one usable price.
    pub fn has_prices(&self) -> bool {
        !self.cheapest.is_empty() || !self.cabin_prices.is_empty()
    }
}
