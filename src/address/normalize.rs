// src/address/normalize.rs
use crate::address::postcode::find_postcode_span;
use once_cell::sync::Lazy;
use regex::Regex;

/// Place names that get appended to addresses inconsistently and carry no
/// information once the postcode is known. Longest names first.
pub const BOROUGH_NAMES: &[&str] = &[
    "kensington and chelsea",
    "hammersmith and fulham",
    "richmond upon thames",
    "kingston upon thames",
    "barking and dagenham",
    "city of westminster",
    "city of london",
    "tower hamlets",
    "north walsham",
    "london",
];

static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.,]").unwrap());
static LETTER_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z])([0-9])").unwrap());
static DIGIT_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9])([a-z])").unwrap());
static UNIT_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:flat|apartment)\b").unwrap());
static UNIT_WITH_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:flat|apartment)\b(?:\s*[0-9]+(?:\s*[a-z]\b)?)?").unwrap());
static FLOOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:ground|first|second|third|fourth|fifth|top|basement)\s+floor\b").unwrap()
});
static SIDE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:left|right)\b").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// Passes rarely exceed two; the cap only guards against pathological input.
const MAX_PASSES: usize = 16;

/// Turns free-text addresses into a canonical lowercase form so two
/// spellings of the same address compare equal.
#[derive(Debug, Clone)]
pub struct Normalizer {
    boroughs: Option<Localities>,
    /// Also drop the number after "flat"/"apartment" ("flat 2" -> "").
    strip_unit_numbers: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(BOROUGH_NAMES)
    }
}

impl Normalizer {
    pub fn new<S: AsRef<str>>(boroughs: &[S]) -> Self {
        Self {
            boroughs: locality_patterns(boroughs),
            strip_unit_numbers: false,
        }
    }

    pub fn strip_unit_numbers(mut self, strip: bool) -> Self {
        self.strip_unit_numbers = strip;
        self
    }

    pub fn normalize(&self, address: &str) -> String {
        // Removing a token can join its neighbours into a new postcode or
        // filler phrase, so repeat until nothing changes.
        let mut current = self.pass(address);
        for _ in 0..MAX_PASSES {
            let next = self.pass(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    /// Removes borough names only, keeping the rest of the text as typed.
    pub fn strip_boroughs(&self, address: &str) -> String {
        let stripped = self.strip_localities(address);
        let collapsed = WHITESPACE.replace_all(&stripped, " ");
        collapsed
            .trim()
            .trim_matches(',')
            .trim()
            .replace(" ,", ",")
            .replace(",,", ",")
    }

    /// A borough only counts as a locality when it fills a whole
    /// comma-separated segment or sits right before the postcode, so street
    /// names like "London Road" survive.
    fn strip_localities(&self, address: &str) -> String {
        let Some(localities) = &self.boroughs else {
            return address.to_string();
        };

        let mut s = address.to_string();
        if let Some(span) = find_postcode_span(&s) {
            let start = localities.before_postcode.find(&s[..span.start]).map(|m| m.start());
            if let Some(start) = start {
                s.replace_range(start..span.start, " ");
            }
        }

        s.split(',')
            .filter(|segment| !localities.segment.is_match(segment))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn pass(&self, input: &str) -> String {
        let mut s = self.strip_localities(&input.to_lowercase());
        s = PUNCTUATION.replace_all(&s, "").into_owned();

        while let Some(span) = find_postcode_span(&s) {
            s.replace_range(span, " ");
        }

        s = LETTER_DIGIT.replace_all(&s, "$1 $2").into_owned();
        s = DIGIT_LETTER.replace_all(&s, "$1 $2").into_owned();

        let unit = if self.strip_unit_numbers {
            &*UNIT_WITH_NUMBER
        } else {
            &*UNIT_WORD
        };
        s = unit.replace_all(&s, " ").into_owned();
        s = FLOOR.replace_all(&s, " ").into_owned();
        s = SIDE.replace_all(&s, " ").into_owned();

        WHITESPACE.replace_all(&s, " ").trim().to_string()
    }
}

#[derive(Debug, Clone)]
struct Localities {
    /// Segment that is nothing but a borough.
    segment: Regex,
    /// Borough at the end of the text preceding a postcode.
    before_postcode: Regex,
}

fn locality_patterns<S: AsRef<str>>(boroughs: &[S]) -> Option<Localities> {
    let alternatives: Vec<String> = boroughs
        .iter()
        .map(|b| b.as_ref().trim().to_lowercase())
        .filter(|b| !b.is_empty())
        .map(|b| {
            b.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect();

    if alternatives.is_empty() {
        return None;
    }

    let names = alternatives.join("|");
    Some(Localities {
        segment: Regex::new(&format!(r"(?i)^[\s.]*(?:{names})[\s.]*$")).ok()?,
        before_postcode: Regex::new(&format!(r"(?i)\b(?:{names})[\s,]*$")).ok()?,
    })
}
