pub mod floor_area;
pub mod price;
pub mod search;

pub use floor_area::{get_floor_area, FloorAreaResponse};
pub use price::{get_price_per_sqft, PriceRequest, PriceResponse};
pub use search::{search, NoMatchPolicy, SearchState, SearchSuccess};
