pub mod export_xlsx;
pub mod processed_xlsx;

pub use export_xlsx::export_properties_xlsx;
pub use processed_xlsx::{export_processed_xlsx, ERRORS_HEADER};
