use crate::address::compact_postcode;
use crate::config::AppConfig;
use crate::propertydata::models::{FloorAreasResponse, SoldPricesResponse};
use crate::propertydata::{PropertyDataApi, PropertyDataError};
use crate::state::AppState;
use calamine::{open_workbook_auto_from_rs, Reader};
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use rust_xlsxwriter::Workbook;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::Cursor;

/// 2024-06-01 12:00 UTC
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// In-process stand-in for the property data API. Unknown postcodes get
/// the same error payload the real API sends.
#[derive(Default)]
pub struct StubApi {
    floor_areas: HashMap<String, FloorAreasResponse>,
    prices: HashMap<String, SoldPricesResponse>,
    calls: Mutex<Vec<String>>,
}

impl StubApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_floor_areas(mut self, postcode: &str, body: Value) -> Self {
        let parsed = serde_json::from_value(body).expect("floor area fixture");
        self.floor_areas.insert(compact_postcode(postcode), parsed);
        self
    }

    pub fn with_prices(mut self, postcode: &str, body: Value) -> Self {
        let parsed = serde_json::from_value(body).expect("price fixture");
        self.prices.insert(compact_postcode(postcode), parsed);
        self
    }

    /// "floor-areas <postcode>" / "prices <postcode>" in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

fn not_found() -> PropertyDataError {
    PropertyDataError::Api("Postcode not found".into())
}

impl PropertyDataApi for StubApi {
    fn floor_areas(&self, postcode: &str) -> Result<FloorAreasResponse, PropertyDataError> {
        self.calls.lock().push(format!("floor-areas {postcode}"));
        self.floor_areas
            .get(&compact_postcode(postcode))
            .cloned()
            .ok_or_else(not_found)
    }

    fn sold_prices_per_sqft(&self, postcode: &str) -> Result<SoldPricesResponse, PropertyDataError> {
        self.calls.lock().push(format!("prices {postcode}"));
        self.prices
            .get(&compact_postcode(postcode))
            .cloned()
            .ok_or_else(not_found)
    }
}

/// `/floor-areas` payload; every property has 3 rooms and a 2020 inspection.
pub fn floor_areas_json(properties: &[(&str, Option<f64>)]) -> Value {
    let known: Vec<Value> = properties
        .iter()
        .map(|(address, sq_ft)| {
            json!({
                "address": address,
                "square_feet": sq_ft,
                "habitable_rooms": 3,
                "inspection_date": "2020-01-01",
            })
        })
        .collect();
    json!({ "status": "success", "known_floor_areas": known })
}

/// `/sold-prices-per-sqf` payload.
pub fn prices_json(average: f64, points: u64, last_updated: &str) -> Value {
    json!({
        "status": "success",
        "last_updated": last_updated,
        "data": {
            "average": average,
            "points_analysed": points,
            "confidence_interval": { "lower": average * 0.9, "upper": average * 1.1 },
        },
    })
}

pub fn test_state(api: StubApi) -> AppState {
    test_state_with(AppConfig::default(), api)
}

pub fn test_state_with(config: AppConfig, api: StubApi) -> AppState {
    AppState::new(config, Box::new(api)).with_clock(fixed_now)
}

/// Builds an .xlsx in memory, one `(name, rows)` pair per sheet.
pub fn xlsx_bytes(sheets: &[(&str, &[&[&str]])]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if !cell.is_empty() {
                    worksheet.write_string(r as u32, c as u16, *cell).unwrap();
                }
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

/// Every sheet of an .xlsx as text cells.
pub fn read_xlsx(bytes: &[u8]) -> Vec<(String, Vec<Vec<String>>)> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).unwrap();
    workbook
        .sheet_names()
        .into_iter()
        .map(|name| {
            let range = workbook.worksheet_range(&name).unwrap();
            let rows = range
                .rows()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect();
            (name, rows)
        })
        .collect()
}
