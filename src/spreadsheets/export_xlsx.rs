use crate::domain::PropertyRecord;
use crate::errors::ServerError;
use crate::responses::xlsx_response;
use crate::responses::ResultResp;
use rust_xlsxwriter::{Workbook, Worksheet};

pub const PROPERTY_SHEET: &str = "Property Data";

const HEADERS: [&str; 16] = [
    "address",
    "floor_area_sq_ft",
    "floor_area_sq_m",
    "habitable_rooms",
    "inspection_date",
    "price_per_sq_ft",
    "price_per_sq_m",
    "estimated_value",
    "pricing_date",
    "transaction_count",
    "lower_bound_price",
    "upper_bound_price",
    "lower_bound_value",
    "upper_bound_value",
    "confidence_level",
    "data_age_days",
];

/// Search term reduced to `[A-Za-z0-9_]` for use in a filename.
pub fn sanitize_filename_part(term: &str) -> String {
    term.trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

pub(crate) fn write_headers(worksheet: &mut Worksheet, headers: &[&str]) -> Result<(), ServerError> {
    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(|e| ServerError::XlsxError(format!("Failed to write header '{}': {}", header, e)))?;
    }
    Ok(())
}

pub(crate) fn write_text(worksheet: &mut Worksheet, row: u32, col: u16, value: &str) -> Result<(), ServerError> {
    worksheet
        .write_string(row, col, value)
        .map_err(|e| ServerError::XlsxError(format!("Failed to write cell ({row}, {col}): {e}")))?;
    Ok(())
}

/// Missing numbers leave the cell blank.
pub(crate) fn write_opt_number(worksheet: &mut Worksheet, row: u32, col: u16, value: Option<f64>) -> Result<(), ServerError> {
    if let Some(v) = value {
        worksheet
            .write_number(row, col, v)
            .map_err(|e| ServerError::XlsxError(format!("Failed to write cell ({row}, {col}): {e}")))?;
    }
    Ok(())
}

pub fn properties_workbook(properties: &[PropertyRecord]) -> Result<Vec<u8>, ServerError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(PROPERTY_SHEET)
        .map_err(|e| ServerError::XlsxError(format!("Failed to name sheet: {}", e)))?;

    write_headers(worksheet, &HEADERS)?;

    for (i, p) in properties.iter().enumerate() {
        let r = (i + 1) as u32;

        write_text(worksheet, r, 0, &p.address)?;
        write_opt_number(worksheet, r, 1, p.floor_area_sq_ft)?;
        write_opt_number(worksheet, r, 2, p.floor_area_sq_m)?;
        write_opt_number(worksheet, r, 3, Some(p.habitable_rooms as f64))?;
        write_text(worksheet, r, 4, &p.inspection_date)?;
        write_opt_number(worksheet, r, 5, p.price_per_sq_ft)?;
        write_opt_number(worksheet, r, 6, p.price_per_sq_m)?;
        write_opt_number(worksheet, r, 7, p.estimated_value)?;
        write_text(worksheet, r, 8, p.pricing_date.as_deref().unwrap_or(""))?;
        write_opt_number(worksheet, r, 9, p.transaction_count.map(|n| n as f64))?;
        write_opt_number(worksheet, r, 10, p.lower_bound_price)?;
        write_opt_number(worksheet, r, 11, p.upper_bound_price)?;
        write_opt_number(worksheet, r, 12, p.lower_bound_value)?;
        write_opt_number(worksheet, r, 13, p.upper_bound_value)?;
        write_text(worksheet, r, 14, p.confidence_level.map(|c| c.as_str()).unwrap_or(""))?;
        write_opt_number(worksheet, r, 15, p.data_age_days.map(|d| d as f64))?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ServerError::XlsxError(format!("Failed to save workbook: {}", e)))
}

/// Search results as a download named after the search term.
pub fn export_properties_xlsx(properties: &[PropertyRecord], search_term: &str) -> ResultResp {
    if properties.is_empty() {
        return Err(ServerError::BadRequest("No data to export".into()));
    }

    let buffer = properties_workbook(properties)?;
    xlsx_response(
        buffer,
        &format!("property_data_{}.xlsx", sanitize_filename_part(search_term)),
        &[],
    )
}
