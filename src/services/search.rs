// src/services/search.rs
//
// Interactive search: postcode extraction, lookup, then narrowing the
// postcode's properties down to the typed address.

use crate::address::{
    extract_partial_postcode, validate_partial_postcode, MatchMode, MatchType, Matcher, Normalizer,
};
use crate::domain::PropertyRecord;
use crate::propertydata::PropertyDataApi;
use crate::services::floor_area::lookup_postcode;
use chrono::{DateTime, Utc};
use std::str::FromStr;

/// What to show when the typed address matches nothing in its postcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoMatchPolicy {
    /// Empty table with a "no matching properties" notice.
    #[default]
    EmptyWithNotice,
    /// Every property in the postcode with a notice saying so.
    ShowAllInPostcode,
}

impl NoMatchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoMatchPolicy::EmptyWithNotice => "empty",
            NoMatchPolicy::ShowAllInPostcode => "show-all",
        }
    }
}

impl FromStr for NoMatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "empty" => Ok(NoMatchPolicy::EmptyWithNotice),
            "show-all" => Ok(NoMatchPolicy::ShowAllInPostcode),
            other => Err(format!("expected \"empty\" or \"show-all\", got {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    ShowingAllInPostcode,
    SimilarAddresses,
    NoMatch,
    NoData,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::ShowingAllInPostcode => "Showing all properties in the postcode area",
            Notice::SimilarAddresses => "Exact match not found. Showing similar addresses.",
            Notice::NoMatch => "No matching properties found for this address.",
            Notice::NoData => "No floor area data is available for the provided postcode.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSuccess {
    pub query: String,
    pub postcode: String,
    pub properties: Vec<PropertyRecord>,
    pub match_type: Option<MatchType>,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Idle,
    Searching,
    Success(SearchSuccess),
    Error(String),
}

/// One search box. `submit` borrows mutably, so a search cannot start
/// while another is still running on the same instance.
pub struct PropertySearch<'a> {
    api: &'a dyn PropertyDataApi,
    normalizer: &'a Normalizer,
    policy: NoMatchPolicy,
    state: SearchState,
}

impl<'a> PropertySearch<'a> {
    pub fn new(api: &'a dyn PropertyDataApi, normalizer: &'a Normalizer, policy: NoMatchPolicy) -> Self {
        Self {
            api,
            normalizer,
            policy,
            state: SearchState::Idle,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn into_state(self) -> SearchState {
        self.state
    }

    pub fn submit(&mut self, input: &str, now: DateTime<Utc>) -> &SearchState {
        self.state = SearchState::Searching;
        self.state = match self.run(input, now) {
            Ok(success) => SearchState::Success(success),
            Err(message) => {
                tracing::debug!(input, message = %message, "search failed");
                SearchState::Error(message)
            }
        };
        &self.state
    }

    fn run(&self, input: &str, now: DateTime<Utc>) -> Result<SearchSuccess, String> {
        let query = input.trim();
        if query.is_empty() {
            return Err("Please enter a valid UK postcode or address".to_string());
        }

        let postcode = extract_partial_postcode(query)
            .ok_or_else(|| "Please include a valid UK postcode in the address".to_string())?;

        let resp = lookup_postcode(self.api, &postcode, now);
        if !resp.is_success() {
            return Err(resp
                .message
                .unwrap_or_else(|| "Failed to fetch property data".to_string()));
        }
        let properties = resp.data.properties;

        let mut success = SearchSuccess {
            query: query.to_string(),
            postcode: postcode.clone(),
            properties: Vec::new(),
            match_type: None,
            notice: None,
        };

        if properties.is_empty() {
            success.notice = Some(Notice::NoData);
            return Ok(success);
        }

        // A partial postcode is not removed by normalization, so cut the
        // extracted text out before matching.
        let address_part = query.replacen(postcode.as_str(), " ", 1);
        let postcode_only = validate_partial_postcode(query) || self.normalizer.normalize(&address_part).is_empty();
        if postcode_only {
            success.properties = properties;
            success.notice = Some(Notice::ShowingAllInPostcode);
            return Ok(success);
        }

        let result = Matcher::with_normalizer(self.normalizer, MatchMode::Substring).find(&properties, &address_part);
        tracing::debug!(
            query,
            matches = result.matches.len(),
            match_type = ?result.match_type,
            "address matched against postcode"
        );

        if !result.matches.is_empty() {
            success.notice = match result.match_type {
                MatchType::Exact => None,
                _ => Some(Notice::SimilarAddresses),
            };
            success.match_type = Some(result.match_type);
            success.properties = result.matches;
            return Ok(success);
        }

        match self.policy {
            NoMatchPolicy::EmptyWithNotice => success.notice = Some(Notice::NoMatch),
            NoMatchPolicy::ShowAllInPostcode => {
                success.properties = properties;
                success.notice = Some(Notice::ShowingAllInPostcode);
            }
        }
        Ok(success)
    }
}

/// Runs one search to completion and returns where it ended up.
pub fn search(
    api: &dyn PropertyDataApi,
    normalizer: &Normalizer,
    policy: NoMatchPolicy,
    input: &str,
    now: DateTime<Utc>,
) -> SearchState {
    let mut search = PropertySearch::new(api, normalizer, policy);
    search.submit(input, now);
    search.into_state()
}
