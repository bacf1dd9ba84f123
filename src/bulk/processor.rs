// src/bulk/processor.rs
use crate::address::{MatchMode, Matcher, Normalizer};
use crate::bulk::preview::PreviewRow;
use crate::propertydata::PropertyDataApi;
use crate::services::floor_area::get_floor_area;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::str::FromStr;

/// How a spreadsheet row becomes the text sent to the lookup and matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulkQueryStrategy {
    /// Look up by postcode, match on the address cell.
    PostcodeOnly,
    /// "<address>, <postcode>"
    #[default]
    AddressWithPostcode,
    /// Like `AddressWithPostcode` with borough names cut from the address.
    AddressWithoutBorough,
}

impl BulkQueryStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkQueryStrategy::PostcodeOnly => "postcode-only",
            BulkQueryStrategy::AddressWithPostcode => "address-with-postcode",
            BulkQueryStrategy::AddressWithoutBorough => "address-without-borough",
        }
    }

    /// (lookup input, address to match against the results)
    pub fn build(&self, row: &PreviewRow, normalizer: &Normalizer) -> (String, String) {
        let address = row.address.trim();
        let postcode = row.postcode.trim();
        match self {
            BulkQueryStrategy::PostcodeOnly => (postcode.to_string(), address.to_string()),
            BulkQueryStrategy::AddressWithPostcode => {
                (format!("{address}, {postcode}"), address.to_string())
            }
            BulkQueryStrategy::AddressWithoutBorough => {
                let stripped = normalizer.strip_boroughs(address);
                (format!("{stripped}, {postcode}"), stripped)
            }
        }
    }
}

impl FromStr for BulkQueryStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            BulkQueryStrategy::PostcodeOnly,
            BulkQueryStrategy::AddressWithPostcode,
            BulkQueryStrategy::AddressWithoutBorough,
        ]
        .into_iter()
        .find(|v| v.as_str() == s.trim())
        .ok_or_else(|| format!("unknown bulk query strategy {s:?}"))
    }
}

/// One output row of the "Processed Data" workbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedRow {
    pub address: String,
    pub postcode: String,
    pub floor_area_sq_ft: Option<f64>,
    pub floor_area_sq_m: Option<f64>,
    pub habitable_rooms: u32,
    pub inspection_date: String,
    pub estimated_value: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkReport {
    pub processed: Vec<ProcessedRow>,
    pub errors: Vec<String>,
}

impl BulkReport {
    pub fn has_output(&self) -> bool {
        !self.processed.is_empty()
    }
}

pub struct BulkProcessor<'a> {
    api: &'a dyn PropertyDataApi,
    normalizer: &'a Normalizer,
    strategy: BulkQueryStrategy,
}

impl<'a> BulkProcessor<'a> {
    pub fn new(api: &'a dyn PropertyDataApi, normalizer: &'a Normalizer, strategy: BulkQueryStrategy) -> Self {
        Self {
            api,
            normalizer,
            strategy,
        }
    }

    /// Looks up every valid row in turn. A failing row is recorded and the
    /// run carries on with the next one.
    pub fn process(&self, rows: &[PreviewRow], now: DateTime<Utc>) -> BulkReport {
        let mut report = BulkReport::default();
        let matcher = Matcher::with_normalizer(self.normalizer, MatchMode::Token);

        for row in rows.iter().filter(|r| r.is_valid) {
            let (query, match_address) = self.strategy.build(row, self.normalizer);
            let resp = get_floor_area(self.api, &query, now);
            if !resp.is_success() {
                let message = resp.message.unwrap_or_default();
                tracing::warn!(address = %row.address, postcode = %row.postcode, error = %message, "bulk row lookup failed");
                report
                    .errors
                    .push(format!("Error: {message} for address: {}", row.address));
                continue;
            }

            match matcher.best(&resp.data.properties, &match_address) {
                Some((property, match_type)) => {
                    tracing::debug!(address = %row.address, matched = %property.address, ?match_type, "bulk row matched");
                    report.processed.push(ProcessedRow {
                        address: row.address.clone(),
                        postcode: row.postcode.clone(),
                        floor_area_sq_ft: property.floor_area_sq_ft,
                        floor_area_sq_m: property.floor_area_sq_m,
                        habitable_rooms: property.habitable_rooms,
                        inspection_date: property.inspection_date,
                        estimated_value: property.estimated_value,
                    });
                }
                None => {
                    let error = format!("No matching property found for address: {}", row.address);
                    tracing::warn!(postcode = %row.postcode, candidates = resp.data.properties.len(), "{error}");
                    report.errors.push(error);
                }
            }
        }

        tracing::info!(
            processed = report.processed.len(),
            errors = report.errors.len(),
            strategy = self.strategy.as_str(),
            "bulk run finished"
        );
        report
    }
}
