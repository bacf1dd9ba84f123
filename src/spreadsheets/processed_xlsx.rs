use crate::bulk::ProcessedRow;
use crate::errors::ServerError;
use crate::responses::{xlsx_response, ResultResp};
use crate::spreadsheets::export_xlsx::{write_headers, write_opt_number, write_text};
use chrono::NaiveDate;
use rust_xlsxwriter::Workbook;

pub const PROCESSED_SHEET: &str = "Processed Data";
pub const ERRORS_HEADER: &str = "X-Processing-Errors";

const HEADERS: [&str; 7] = [
    "address",
    "postcode",
    "floor_area_sq_ft",
    "floor_area_sq_m",
    "habitable_rooms",
    "inspection_date",
    "estimated_value",
];

pub fn processed_workbook(rows: &[ProcessedRow]) -> Result<Vec<u8>, ServerError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(PROCESSED_SHEET)
        .map_err(|e| ServerError::XlsxError(format!("Failed to name sheet: {}", e)))?;

    write_headers(worksheet, &HEADERS)?;

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        write_text(worksheet, r, 0, &row.address)?;
        write_text(worksheet, r, 1, &row.postcode)?;
        write_opt_number(worksheet, r, 2, row.floor_area_sq_ft)?;
        write_opt_number(worksheet, r, 3, row.floor_area_sq_m)?;
        write_opt_number(worksheet, r, 4, Some(row.habitable_rooms as f64))?;
        write_text(worksheet, r, 5, &row.inspection_date)?;
        write_opt_number(worksheet, r, 6, row.estimated_value)?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ServerError::XlsxError(format!("Failed to save workbook: {}", e)))
}

/// Bulk results as `processed_data_<date>.xlsx`, with the failed row count
/// in a response header.
pub fn export_processed_xlsx(rows: &[ProcessedRow], error_count: usize, date: NaiveDate) -> ResultResp {
    let buffer = processed_workbook(rows)?;
    xlsx_response(
        buffer,
        &format!("processed_data_{}.xlsx", date.format("%Y-%m-%d")),
        &[(ERRORS_HEADER, error_count.to_string())],
    )
}
