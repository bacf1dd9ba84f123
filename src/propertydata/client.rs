// client.rs
use crate::address::compact_postcode;
use crate::propertydata::models::{FloorAreasResponse, SoldPricesResponse};
use crate::propertydata::PropertyDataError;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

const USER_AGENT: &str = concat!("floor-area-finder/", env!("CARGO_PKG_VERSION"));

/// The two postcode lookups the service needs from the property data API.
/// Implementations return `Err(PropertyDataError::Api)` when the API itself
/// reports `status: "error"`.
pub trait PropertyDataApi: Send + Sync {
    fn floor_areas(&self, postcode: &str) -> Result<FloorAreasResponse, PropertyDataError>;
    fn sold_prices_per_sqft(&self, postcode: &str) -> Result<SoldPricesResponse, PropertyDataError>;
}

pub struct PropertyDataClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl PropertyDataClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, PropertyDataError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| PropertyDataError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
        })
    }

    fn get_json<T: DeserializeOwned>(&self, endpoint: &str, postcode: &str) -> Result<T, PropertyDataError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(PropertyDataError::MissingApiKey)?;
        let postcode = compact_postcode(postcode);
        let url = format!("{}/{}", self.base_url, endpoint);
        let start = Instant::now();

        let resp = self
            .client
            .get(&url)
            .query(&[("key", api_key), ("postcode", postcode.as_str())])
            .send()
            .map_err(|e| PropertyDataError::Network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| PropertyDataError::Network(e.to_string()))?;

        tracing::debug!(
            endpoint,
            postcode = %postcode,
            status = %status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "property data response"
        );

        // Error payloads come back as JSON on 4xx too, so look at the body
        // before the HTTP status.
        if let Some(message) = api_error_message(&text) {
            return Err(PropertyDataError::Api(message));
        }

        if !status.is_success() {
            return Err(PropertyDataError::Network(format!("{endpoint} returned HTTP {status}")));
        }

        serde_json::from_str(&text).map_err(|e| PropertyDataError::Deserialize(e.to_string()))
    }
}

impl PropertyDataApi for PropertyDataClient {
    fn floor_areas(&self, postcode: &str) -> Result<FloorAreasResponse, PropertyDataError> {
        self.get_json("floor-areas", postcode)
    }

    fn sold_prices_per_sqft(&self, postcode: &str) -> Result<SoldPricesResponse, PropertyDataError> {
        self.get_json("sold-prices-per-sqf", postcode)
    }
}

/// `Some(message)` if `body` is a JSON object with `status: "error"`.
fn api_error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    if json.get("status").and_then(|s| s.as_str()) != Some("error") {
        return None;
    }
    let message = json
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("Property data API returned an error");
    Some(message.to_string())
}
