pub mod matcher;
pub mod normalize;
pub mod postcode;

pub use matcher::{HasAddress, MatchMode, MatchType, Matcher};
pub use normalize::{Normalizer, BOROUGH_NAMES};
pub use postcode::{compact_postcode, extract_partial_postcode, validate_partial_postcode, validate_postcode};
