// src/bulk/preview.rs
use crate::address::validate_partial_postcode;
use crate::bulk::reader::{SheetData, SheetRow};
use serde::Serialize;

pub const ADDRESS_HEADERS: &[&str] = &["Address", "ADDRESS", "address"];
pub const POSTCODE_HEADERS: &[&str] = &["Post Code", "POST CODE", "Postcode", "POSTCODE", "postcode"];

/// Rows shown before processing starts.
pub const PREVIEW_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewRow {
    pub address: String,
    pub postcode: String,
    #[serde(rename = "isValid")]
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn first_present(row: &SheetRow, headers: &[&str]) -> String {
    headers
        .iter()
        .filter_map(|h| row.get(*h))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .unwrap_or_default()
        .to_string()
}

pub fn validate_row(address: &str, postcode: &str) -> Result<(), &'static str> {
    if address.trim().is_empty() {
        return Err("Missing address");
    }
    if !validate_partial_postcode(postcode) {
        return Err("Missing or invalid postcode");
    }
    Ok(())
}

/// Validates every row of `sheet`. Rows with neither an address nor a
/// postcode are skipped.
pub fn build_preview(sheet: &SheetData) -> Vec<PreviewRow> {
    sheet
        .rows
        .iter()
        .filter_map(|row| {
            let address = first_present(row, ADDRESS_HEADERS);
            let postcode = first_present(row, POSTCODE_HEADERS);
            if address.is_empty() && postcode.is_empty() {
                return None;
            }

            let error = validate_row(&address, &postcode).err().map(str::to_string);
            Some(PreviewRow {
                is_valid: error.is_none(),
                address,
                postcode,
                error,
            })
        })
        .collect()
}
