// src/services/floor_area.rs
//
// Floor area + price aggregation for one postcode. Both upstream lookups run
// side by side; a failed floor-area lookup fails the whole answer, a failed
// price lookup only leaves the pricing fields empty.

use crate::address::extract_partial_postcode;
use crate::domain::{PricingSnapshot, PropertyRecord};
use crate::propertydata::models::{FloorAreasResponse, SoldPricesResponse};
use crate::propertydata::{PropertyDataApi, PropertyDataError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorAreaResponse {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: FloorAreaData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FloorAreaData {
    pub properties: Vec<PropertyRecord>,
}

impl FloorAreaResponse {
    pub fn success(properties: Vec<PropertyRecord>) -> Self {
        Self {
            status: Status::Success,
            message: None,
            data: FloorAreaData { properties },
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: Some(message.into()),
            data: FloorAreaData::default(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

/// Entry point behind `get-floor-area`: accepts a postcode or any text
/// containing one. Never fails; problems come back as `status: "error"`.
pub fn get_floor_area(api: &dyn PropertyDataApi, address: &str, now: DateTime<Utc>) -> FloorAreaResponse {
    let address = address.trim();
    if address.is_empty() {
        return FloorAreaResponse::error("Address is required");
    }

    let Some(postcode) = extract_partial_postcode(address) else {
        tracing::debug!(address, "no postcode in lookup request");
        return FloorAreaResponse::error("Please include a valid UK postcode in the address");
    };

    lookup_postcode(api, &postcode, now)
}

pub fn lookup_postcode(api: &dyn PropertyDataApi, postcode: &str, now: DateTime<Utc>) -> FloorAreaResponse {
    let (floor_areas, prices) = std::thread::scope(|s| {
        let prices = s.spawn(|| api.sold_prices_per_sqft(postcode));
        let floor_areas = api.floor_areas(postcode);
        let prices = prices
            .join()
            .unwrap_or_else(|_| Err(PropertyDataError::Network("price lookup panicked".into())));
        (floor_areas, prices)
    });

    let floor_areas = match floor_areas {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!(postcode, error = %e, "floor area lookup failed");
            return FloorAreaResponse::error(user_message(&e));
        }
    };

    let pricing = match prices {
        Ok(p) => pricing_from(&p, now),
        Err(e) => {
            tracing::warn!(postcode, error = %e, "price lookup failed, returning floor areas only");
            None
        }
    };

    let properties = build_properties(floor_areas, pricing.as_ref());
    tracing::info!(postcode, count = properties.len(), priced = pricing.is_some(), "floor areas fetched");
    FloorAreaResponse::success(properties)
}

/// Message safe to show a user; the raw cause only goes to the log.
pub fn user_message(err: &PropertyDataError) -> String {
    match err {
        PropertyDataError::Api(msg) => msg.clone(),
        PropertyDataError::MissingApiKey => err.to_string(),
        PropertyDataError::Network(_) | PropertyDataError::Deserialize(_) => {
            "Failed to fetch property data".to_string()
        }
    }
}

pub fn pricing_from(resp: &SoldPricesResponse, now: DateTime<Utc>) -> Option<PricingSnapshot> {
    let data = resp.data.as_ref()?;
    let bounds = data
        .confidence_interval
        .as_ref()
        .map(|ci| (ci.lower, ci.upper));

    Some(PricingSnapshot::new(
        data.average,
        data.points_analysed.map(|n| n.max(0.0).round() as u64),
        bounds,
        resp.last_updated.as_deref(),
        now,
    ))
}

fn build_properties(resp: FloorAreasResponse, pricing: Option<&PricingSnapshot>) -> Vec<PropertyRecord> {
    resp.known_floor_areas
        .unwrap_or_default()
        .into_iter()
        .map(|area| {
            let record = PropertyRecord::from_floor_area(
                area.address.unwrap_or_default(),
                area.square_feet,
                area.square_meters,
                area.habitable_rooms.map(|r| r.max(0.0).round() as u32).unwrap_or(0),
                area.inspection_date.unwrap_or_default(),
            );
            match pricing {
                Some(p) => record.with_pricing(p),
                None => record,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfidenceLevel;
    use crate::tests::utils::{fixed_now, floor_areas_json, prices_json, StubApi};

    #[test]
    fn rejects_blank_and_postcodeless_input_without_calling_out() {
        let api = StubApi::new();

        let resp = get_floor_area(&api, "   ", fixed_now());
        assert_eq!(resp, FloorAreaResponse::error("Address is required"));

        let resp = get_floor_area(&api, "1 Example Road", fixed_now());
        assert_eq!(
            resp.message.as_deref(),
            Some("Please include a valid UK postcode in the address")
        );
        assert!(resp.data.properties.is_empty());

        assert!(api.calls().is_empty());
    }

    #[test]
    fn combines_floor_areas_and_prices() {
        let api = StubApi::new()
            .with_floor_areas("SW1A1AA", floor_areas_json(&[("1 Example Road", Some(1000.0)), ("2 Example Road", None)]))
            .with_prices("SW1A1AA", prices_json(500.0, 35, "2024-05-22"));

        let resp = get_floor_area(&api, "1 Example Road, SW1A 1AA", fixed_now());
        assert!(resp.is_success());

        let props = &resp.data.properties;
        assert_eq!(props.len(), 2);
        assert_eq!(props[0].floor_area_sq_m, Some(92.9));
        assert_eq!(props[0].estimated_value, Some(500_000.0));
        assert_eq!(props[0].confidence_level, Some(ConfidenceLevel::High));
        assert_eq!(props[0].data_age_days, Some(11));
        assert_eq!(props[1].estimated_value, None);
        assert_eq!(props[1].price_per_sq_ft, Some(500.0));

        let mut calls = api.calls();
        calls.sort();
        assert_eq!(calls, vec!["floor-areas SW1A 1AA", "prices SW1A 1AA"]);
    }

    #[test]
    fn price_failure_degrades_to_floor_areas_only() {
        let api = StubApi::new()
            .with_floor_areas("W149RS", floor_areas_json(&[("18 Example Road", Some(800.0))]));

        let resp = get_floor_area(&api, "W14 9RS", fixed_now());
        assert!(resp.is_success());
        let p = &resp.data.properties[0];
        assert_eq!(p.floor_area_sq_ft, Some(800.0));
        assert_eq!(p.price_per_sq_ft, None);
        assert_eq!(p.estimated_value, None);
        assert_eq!(p.confidence_level, None);
    }

    #[test]
    fn floor_area_failure_is_fatal() {
        let api = StubApi::new().with_prices("W149RS", prices_json(500.0, 35, "2024-05-22"));

        let resp = get_floor_area(&api, "W14 9RS", fixed_now());
        assert_eq!(resp.status, Status::Error);
        assert_eq!(resp.message.as_deref(), Some("Postcode not found"));
        assert!(resp.data.properties.is_empty());
    }

    #[test]
    fn transport_errors_get_a_generic_message() {
        assert_eq!(
            user_message(&PropertyDataError::Network("connection refused".into())),
            "Failed to fetch property data"
        );
        assert_eq!(user_message(&PropertyDataError::MissingApiKey), "API configuration error");
    }

    #[test]
    fn serializes_with_status_field() {
        let json = serde_json::to_value(FloorAreaResponse::error("Address is required")).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Address is required");
        assert_eq!(json["data"]["properties"], serde_json::json!([]));
    }
}
