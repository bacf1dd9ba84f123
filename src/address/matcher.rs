// src/address/matcher.rs
use crate::address::normalize::Normalizer;
use serde::Serialize;
use std::collections::HashSet;

/// Anything with a free-text address the matcher can compare against.
pub trait HasAddress {
    fn address(&self) -> &str;
}

/// How loose the matcher is allowed to get. Each mode includes the
/// stricter passes before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    Substring,
    Token,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Partial,
    Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult<T> {
    pub matches: Vec<T>,
    pub match_type: MatchType,
}

pub struct Matcher<'n> {
    normalizer: &'n Normalizer,
    mode: MatchMode,
}

impl<'n> Matcher<'n> {
    pub fn with_normalizer(normalizer: &'n Normalizer, mode: MatchMode) -> Self {
        Self { normalizer, mode }
    }

    /// Runs the passes in order (exact, substring, token) up to the
    /// configured mode and returns every candidate from the first pass
    /// that finds anything. Source order is preserved.
    pub fn find<T: HasAddress + Clone>(&self, properties: &[T], search: &str) -> MatchResult<T> {
        let needle = self.normalizer.normalize(search);
        let candidates: Vec<(String, &T)> = properties
            .iter()
            .map(|p| (self.normalizer.normalize(p.address()), p))
            .collect();

        tracing::debug!(search, normalized = %needle, candidates = candidates.len(), "matching address");

        let last_type = match self.mode {
            MatchMode::Exact => MatchType::Exact,
            MatchMode::Substring => MatchType::Partial,
            MatchMode::Token => MatchType::Token,
        };

        if needle.is_empty() {
            return MatchResult {
                matches: Vec::new(),
                match_type: last_type,
            };
        }

        let exact = collect(&candidates, |addr| addr == needle);
        if !exact.is_empty() {
            return MatchResult {
                matches: exact,
                match_type: MatchType::Exact,
            };
        }
        if self.mode == MatchMode::Exact {
            return MatchResult {
                matches: exact,
                match_type: MatchType::Exact,
            };
        }

        let partial = collect(&candidates, |addr| {
            !addr.is_empty() && (addr.contains(&needle) || needle.contains(addr))
        });
        if !partial.is_empty() || self.mode == MatchMode::Substring {
            return MatchResult {
                matches: partial,
                match_type: MatchType::Partial,
            };
        }

        let tokens = collect(&candidates, |addr| token_match(&needle, addr));
        MatchResult {
            matches: tokens,
            match_type: MatchType::Token,
        }
    }

    /// First candidate from [`Matcher::find`], if any.
    pub fn best<T: HasAddress + Clone>(&self, properties: &[T], search: &str) -> Option<(T, MatchType)> {
        let result = self.find(properties, search);
        result
            .matches
            .into_iter()
            .next()
            .map(|m| (m, result.match_type))
    }
}

fn collect<T: Clone, F>(candidates: &[(String, &T)], keep: F) -> Vec<T>
where
    F: Fn(&str) -> bool,
{
    candidates
        .iter()
        .filter(|(addr, _)| keep(addr))
        .map(|(_, p)| (*p).clone())
        .collect()
}

fn leading_number<'a>(tokens: &[&'a str]) -> Option<&'a str> {
    tokens
        .iter()
        .copied()
        .find(|t| t.chars().all(|c| c.is_ascii_digit()))
}

/// The search's first number must equal the candidate's first number, and
/// every other search token must appear somewhere in the candidate.
fn token_match(search: &str, candidate: &str) -> bool {
    let search_tokens: Vec<&str> = search.split_whitespace().collect();
    let candidate_tokens: Vec<&str> = candidate.split_whitespace().collect();
    if search_tokens.is_empty() || candidate_tokens.is_empty() {
        return false;
    }

    let number = leading_number(&search_tokens);
    if let Some(n) = number {
        if leading_number(&candidate_tokens) != Some(n) {
            return false;
        }
    }

    let available: HashSet<&str> = candidate_tokens.iter().copied().collect();
    let mut skipped_number = false;
    search_tokens.iter().all(|t| {
        if !skipped_number && Some(*t) == number {
            skipped_number = true;
            return true;
        }
        available.contains(t)
    })
}
