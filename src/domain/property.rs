// src/domain/property.rs

use crate::address::HasAddress;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SQ_FT_TO_SQ_M: f64 = 0.092903;
pub const SQ_M_PER_SQ_FT_PRICE: f64 = 10.764;

/// One property as returned to the browser: floor area from the EPC
/// register, optionally enriched with area-level pricing for its postcode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub address: String,
    pub floor_area_sq_ft: Option<f64>,
    pub floor_area_sq_m: Option<f64>,
    pub habitable_rooms: u32,
    pub inspection_date: String,

    #[serde(default)]
    pub price_per_sq_ft: Option<f64>,
    #[serde(default)]
    pub price_per_sq_m: Option<f64>,
    #[serde(default)]
    pub estimated_value: Option<f64>,
    #[serde(default)]
    pub pricing_date: Option<String>,
    #[serde(default)]
    pub transaction_count: Option<u64>,
    #[serde(default)]
    pub lower_bound_price: Option<f64>,
    #[serde(default)]
    pub upper_bound_price: Option<f64>,
    #[serde(default)]
    pub lower_bound_value: Option<f64>,
    #[serde(default)]
    pub upper_bound_value: Option<f64>,
    #[serde(default)]
    pub confidence_level: Option<ConfidenceLevel>,
    #[serde(default)]
    pub data_age_days: Option<i64>,
}

impl HasAddress for PropertyRecord {
    fn address(&self) -> &str {
        &self.address
    }
}

impl PropertyRecord {
    /// Builds a record from raw floor-area values. Square metres are derived
    /// from square feet when possible and only taken from the source when
    /// square feet are missing.
    pub fn from_floor_area(
        address: impl Into<String>,
        square_feet: Option<f64>,
        square_meters: Option<f64>,
        habitable_rooms: u32,
        inspection_date: impl Into<String>,
    ) -> Self {
        let floor_area_sq_m = convert_to_square_meters(square_feet).or(square_meters);

        Self {
            address: address.into(),
            floor_area_sq_ft: square_feet,
            floor_area_sq_m,
            habitable_rooms,
            inspection_date: inspection_date.into(),
            price_per_sq_ft: None,
            price_per_sq_m: None,
            estimated_value: None,
            pricing_date: None,
            transaction_count: None,
            lower_bound_price: None,
            upper_bound_price: None,
            lower_bound_value: None,
            upper_bound_value: None,
            confidence_level: None,
            data_age_days: None,
        }
    }

    /// Copies the postcode-level pricing onto this record and derives the
    /// value estimates from its floor area.
    pub fn with_pricing(mut self, pricing: &PricingSnapshot) -> Self {
        self.price_per_sq_ft = pricing.price_per_sq_ft;
        self.price_per_sq_m = pricing.price_per_sq_m;
        self.pricing_date = pricing.pricing_date.clone();
        self.transaction_count = Some(pricing.transaction_count);
        self.lower_bound_price = pricing.lower_bound_price;
        self.upper_bound_price = pricing.upper_bound_price;
        self.confidence_level = Some(pricing.confidence_level);
        self.data_age_days = pricing.data_age_days;

        self.estimated_value = multiply(self.floor_area_sq_ft, pricing.price_per_sq_ft);
        self.lower_bound_value = multiply(self.floor_area_sq_ft, pricing.lower_bound_price);
        self.upper_bound_value = multiply(self.floor_area_sq_ft, pricing.upper_bound_price);
        self
    }
}

/// Area-level price statistics for one postcode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingSnapshot {
    pub price_per_sq_ft: Option<f64>,
    pub price_per_sq_m: Option<f64>,
    pub pricing_date: Option<String>,
    pub transaction_count: u64,
    pub lower_bound_price: Option<f64>,
    pub upper_bound_price: Option<f64>,
    pub data_age_days: Option<i64>,
    pub confidence_level: ConfidenceLevel,
}

impl PricingSnapshot {
    pub fn new(
        average_per_sq_ft: Option<f64>,
        points_analysed: Option<u64>,
        bounds: Option<(Option<f64>, Option<f64>)>,
        last_updated: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        let data_age_days = last_updated.and_then(|d| data_age_days(d, now));
        let (lower, upper) = bounds.unwrap_or((None, None));
        let price_per_sq_ft = average_per_sq_ft.filter(|p| *p > 0.0);

        Self {
            price_per_sq_ft,
            price_per_sq_m: price_per_sq_ft.map(|p| p * SQ_M_PER_SQ_FT_PRICE),
            pricing_date: last_updated.map(str::to_string),
            transaction_count: points_analysed.unwrap_or(0),
            lower_bound_price: lower,
            upper_bound_price: upper,
            data_age_days,
            confidence_level: ConfidenceLevel::from_sample(points_analysed, data_age_days),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// High: more than 30 sales, younger than 90 days.
    /// Medium: more than 10 sales, younger than 180 days.
    /// Anything else, including unknown sample size or age, is Low.
    pub fn from_sample(sample_size: Option<u64>, data_age_days: Option<i64>) -> Self {
        match (sample_size, data_age_days) {
            (Some(n), Some(age)) if n > 30 && age < 90 => ConfidenceLevel::High,
            (Some(n), Some(age)) if n > 10 && age < 180 => ConfidenceLevel::Medium,
            _ => ConfidenceLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn convert_to_square_meters(square_feet: Option<f64>) -> Option<f64> {
    square_feet.map(|ft| round2(ft * SQ_FT_TO_SQ_M))
}

fn multiply(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a * b),
        _ => None,
    }
}

/// Parses the date formats the upstream API and EPC data use.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Whole days between `last_updated` and `now`, rounded up.
pub fn data_age_days(last_updated: &str, now: DateTime<Utc>) -> Option<i64> {
    let then = parse_date(last_updated)?;
    let millis = (now - then).num_milliseconds().abs();
    const DAY_MS: i64 = 24 * 60 * 60 * 1000;
    Some((millis + DAY_MS - 1) / DAY_MS)
}
