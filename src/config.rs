//! Runtime configuration read from the process environment.

use crate::address::BOROUGH_NAMES;
use crate::bulk::BulkQueryStrategy;
use crate::services::NoMatchPolicy;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.propertydata.co.uk";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_MAX_WORKERS: usize = 8;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Key for the upstream property data API. `None` makes every lookup
    /// fail with a configuration error instead of calling out.
    pub api_key: Option<String>,
    pub base_url: String,
    pub bind_addr: SocketAddr,
    pub max_workers: usize,
    pub request_timeout: Duration,
    pub no_match_policy: NoMatchPolicy,
    pub bulk_strategy: BulkQueryStrategy,
    pub boroughs: Vec<String>,
    /// Drop the number after "flat"/"apartment" when comparing addresses.
    pub strip_flat_numbers: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_workers: DEFAULT_MAX_WORKERS,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            no_match_policy: NoMatchPolicy::default(),
            bulk_strategy: BulkQueryStrategy::default(),
            boroughs: BOROUGH_NAMES.iter().map(|b| b.to_string()).collect(),
            strip_flat_numbers: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any name -> value lookup, so tests do not
    /// have to mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = AppConfig::default();

        cfg.api_key = lookup("PROPERTY_DATA_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        if let Some(url) = lookup("PROPERTY_DATA_BASE_URL") {
            cfg.base_url = url.trim_end_matches('/').to_string();
        }

        let bind = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        cfg.bind_addr = bind.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: bind.clone(),
            reason: e.to_string(),
        })?;

        if let Some(raw) = lookup("MAX_WORKERS") {
            cfg.max_workers = parse_positive("MAX_WORKERS", &raw)? as usize;
        }

        if let Some(raw) = lookup("REQUEST_TIMEOUT_SECS") {
            cfg.request_timeout = Duration::from_secs(parse_positive("REQUEST_TIMEOUT_SECS", &raw)?);
        }

        if let Some(raw) = lookup("NO_MATCH_POLICY") {
            cfg.no_match_policy = raw.parse().map_err(|reason| ConfigError::Invalid {
                name: "NO_MATCH_POLICY",
                value: raw.clone(),
                reason,
            })?;
        }

        if let Some(raw) = lookup("BULK_QUERY_STRATEGY") {
            cfg.bulk_strategy = raw.parse().map_err(|reason| ConfigError::Invalid {
                name: "BULK_QUERY_STRATEGY",
                value: raw.clone(),
                reason,
            })?;
        }

        if let Some(raw) = lookup("STRIP_FLAT_NUMBERS") {
            cfg.strip_flat_numbers = parse_flag("STRIP_FLAT_NUMBERS", &raw)?;
        }

        Ok(cfg)
    }
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: raw.to_string(),
            reason: "expected true or false".into(),
        }),
    }
}

fn parse_positive(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        Ok(_) => Err(ConfigError::Invalid {
            name,
            value: raw.to_string(),
            reason: "must be greater than zero".into(),
        }),
        Err(e) => Err(ConfigError::Invalid {
            name,
            value: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}
