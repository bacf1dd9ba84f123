use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

// floor-areas
//  ├── status
//  ├── postcode
//  └── known_floor_areas[]
//       ├── address
//       ├── square_feet
//       ├── square_meters
//       ├── habitable_rooms
//       └── inspection_date
//
// sold-prices-per-sqf
//  ├── status
//  ├── postcode
//  ├── last_updated
//  └── data
//       ├── average
//       ├── points_analysed
//       └── confidence_interval { lower, upper }

#[derive(Debug, Clone, Deserialize)]
pub struct FloorAreasResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub known_floor_areas: Option<Vec<KnownFloorArea>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KnownFloorArea {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub square_feet: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub square_meters: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub habitable_rooms: Option<f64>,
    #[serde(default)]
    pub inspection_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SoldPricesResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub data: Option<SoldPriceData>,
    #[serde(default)]
    pub property_type_prices: Option<Map<String, Value>>,
    #[serde(default)]
    pub property_condition_prices: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SoldPriceData {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub average: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub points_analysed: Option<f64>,
    #[serde(default)]
    pub confidence_interval: Option<ConfidenceInterval>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfidenceInterval {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lower: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub upper: Option<f64>,
}

/// Numbers sometimes arrive as strings or nulls; anything that is not a
/// finite number becomes `None` instead of failing the whole payload.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite()))
}
