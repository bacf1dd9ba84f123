// src/services/price.rs
use crate::address::{extract_partial_postcode, validate_postcode};
use crate::domain::ConfidenceLevel;
use crate::propertydata::PropertyDataApi;
use crate::services::floor_area::{pricing_from, user_message, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /api/get-price-per-sqft`. Older clients send the postcode
/// under `address`, newer ones under `postcode`.
#[derive(Debug, Default, Deserialize)]
pub struct PriceRequest {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
}

impl PriceRequest {
    fn input(&self) -> Option<&str> {
        self.postcode
            .as_deref()
            .or(self.address.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceData {
    pub postcode: String,
    pub price_per_sq_ft: Option<f64>,
    pub price_per_sq_m: Option<f64>,
    pub pricing_date: Option<String>,
    pub transaction_count: u64,
    pub lower_bound_price: Option<f64>,
    pub upper_bound_price: Option<f64>,
    pub confidence_level: ConfidenceLevel,
    pub data_age_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type_prices: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_condition_prices: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceResponse {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PriceData>,
}

impl PriceResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: Some(message.into()),
            data: None,
        }
    }
}

pub fn get_price_per_sqft(api: &dyn PropertyDataApi, req: &PriceRequest, now: DateTime<Utc>) -> PriceResponse {
    let Some(input) = req.input() else {
        return PriceResponse::error("Postcode is required");
    };
    // A bare full postcode is used as typed; anything else is searched.
    let postcode = if validate_postcode(input) {
        Some(input.to_string())
    } else {
        extract_partial_postcode(input)
    };
    let Some(postcode) = postcode else {
        return PriceResponse::error("Please include a valid UK postcode in the address");
    };

    let resp = match api.sold_prices_per_sqft(&postcode) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(postcode = %postcode, error = %e, "price lookup failed");
            return PriceResponse::error(user_message(&e));
        }
    };

    let Some(pricing) = pricing_from(&resp, now) else {
        return PriceResponse::error("No price data available for this postcode");
    };

    PriceResponse {
        status: Status::Success,
        message: None,
        data: Some(PriceData {
            postcode: resp.postcode.clone().unwrap_or(postcode),
            price_per_sq_ft: pricing.price_per_sq_ft,
            price_per_sq_m: pricing.price_per_sq_m,
            pricing_date: pricing.pricing_date,
            transaction_count: pricing.transaction_count,
            lower_bound_price: pricing.lower_bound_price,
            upper_bound_price: pricing.upper_bound_price,
            confidence_level: pricing.confidence_level,
            data_age_days: pricing.data_age_days,
            property_type_prices: resp.property_type_prices,
            property_condition_prices: resp.property_condition_prices,
        }),
    }
}
