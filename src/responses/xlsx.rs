// responses/xlsx.rs
use crate::errors::ServerError;
use crate::responses::ResultResp;
use astra::{Body, ResponseBuilder};

/// Return XLSX file as HTTP response
pub fn xlsx_response(buffer: Vec<u8>, filename: &str, extra_headers: &[(&str, String)]) -> ResultResp {
    let mut builder = ResponseBuilder::new()
        .status(200)
        .header(
            "Content-Type",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        )
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        );
    for (name, value) in extra_headers {
        builder = builder.header(*name, value.as_str());
    }

    builder
        .body(Body::from(buffer))
        .map_err(|_| ServerError::InternalError) // Convert any builder error
}
