// src/address/postcode.rs
use once_cell::sync::Lazy;
use regex::Regex;

// Full UK postcode, e.g. "SW1A 1AA" or "W149RS". No leading word boundary,
// so a postcode typed straight after the street ("RdSW1A 1AA") is found.
static POSTCODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[A-Z]{1,2}[0-9][0-9A-Z]?\s?[0-9][A-Z]{2}\b").unwrap()
});

// Outward code with an optional partial inward code, e.g. "W14" or "W14 9".
static PARTIAL_POSTCODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[A-Z]{1,2}[0-9][0-9A-Z]?(?:\s?[0-9][A-Z]{0,2})?\b").unwrap()
});

static FULL_POSTCODE_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[A-Z]{1,2}[0-9][0-9A-Z]?\s?[0-9][A-Z]{2}$").unwrap());

static PARTIAL_POSTCODE_ONLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Z]{1,2}[0-9][0-9A-Z]?(?:\s?[0-9][A-Z]{0,2})?$").unwrap()
});

/// First full postcode in `text`, trimmed, in the casing it was typed.
pub fn extract_postcode(text: &str) -> Option<String> {
    POSTCODE
        .find(text)
        .map(|m| m.as_str().trim().to_string())
}

/// Like [`extract_postcode`] but falls back to a partial postcode
/// ("W14 9", "W14") when no full one is present. Postcodes trail
/// addresses, so the last partial candidate is taken.
pub fn extract_partial_postcode(text: &str) -> Option<String> {
    extract_postcode(text).or_else(|| {
        PARTIAL_POSTCODE
            .find_iter(text)
            .last()
            .map(|m| m.as_str().trim().to_string())
    })
}

/// True iff the whole trimmed input is one full postcode.
pub fn validate_postcode(text: &str) -> bool {
    FULL_POSTCODE_ONLY.is_match(text.trim())
}

/// True iff the whole trimmed input is a full or partial postcode.
pub fn validate_partial_postcode(text: &str) -> bool {
    PARTIAL_POSTCODE_ONLY.is_match(text.trim())
}

/// Byte range of the first full postcode in `text`.
pub(crate) fn find_postcode_span(text: &str) -> Option<std::ops::Range<usize>> {
    POSTCODE.find(text).map(|m| m.range())
}

/// Postcode as sent upstream: no whitespace, upper case.
pub fn compact_postcode(postcode: &str) -> String {
    postcode
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}
