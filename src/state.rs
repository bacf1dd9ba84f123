use crate::address::Normalizer;
use crate::bulk::BulkSessions;
use crate::config::AppConfig;
use crate::propertydata::PropertyDataApi;
use chrono::{DateTime, Utc};

/// Everything a request handler needs, shared by all astra workers.
pub struct AppState {
    pub config: AppConfig,
    pub api: Box<dyn PropertyDataApi>,
    pub bulk: BulkSessions,
    pub normalizer: Normalizer,
    clock: fn() -> DateTime<Utc>,
}

impl AppState {
    pub fn new(config: AppConfig, api: Box<dyn PropertyDataApi>) -> Self {
        let normalizer = Normalizer::new(&config.boroughs).strip_unit_numbers(config.strip_flat_numbers);
        Self {
            config,
            api,
            bulk: BulkSessions::default(),
            normalizer,
            clock: Utc::now,
        }
    }

    /// Replaces the wall clock, for deterministic ages in tests.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}
