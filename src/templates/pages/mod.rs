pub mod home;
pub mod preview;
pub mod results;

pub use home::home_page;
pub use preview::{bulk_preview, bulk_report};
pub use results::results_fragment;
