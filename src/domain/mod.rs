pub mod property;
pub mod table;

pub use property::{ConfidenceLevel, PricingSnapshot, PropertyRecord};
pub use table::{sort_properties, SortConfig, SortDirection, SortKey, COLUMNS};
