mod client;
pub mod models;
mod propertydata_error;

pub use client::{PropertyDataApi, PropertyDataClient};
pub use propertydata_error::PropertyDataError;
