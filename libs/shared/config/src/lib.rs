use std::env;
use tracing::warn;

const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;
const DEFAULT_SLOT_SEARCH_HORIZON_DAYS: i64 = 30;

/// Runtime settings for the scheduling core.
#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    /// Upper bound on any single storage call made by a booking operation.
    pub store_timeout_ms: u64,
    /// Period of the background expiry sweep.
    pub sweep_interval_secs: u64,
    /// How many days ahead `next_available_slot` scans.
    pub slot_search_horizon_days: i64,
}

impl SchedulingConfig {
    pub fn from_env() -> Self {
        Self {
            store_timeout_ms: parse_env("SCHEDULING_STORE_TIMEOUT_MS", DEFAULT_STORE_TIMEOUT_MS),
            sweep_interval_secs: parse_env(
                "SCHEDULING_SWEEP_INTERVAL_SECS",
                DEFAULT_SWEEP_INTERVAL_SECS,
            ),
            slot_search_horizon_days: parse_env(
                "SCHEDULING_SLOT_SEARCH_HORIZON_DAYS",
                DEFAULT_SLOT_SEARCH_HORIZON_DAYS,
            ),
        }
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            store_timeout_ms: DEFAULT_STORE_TIMEOUT_MS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            slot_search_horizon_days: DEFAULT_SLOT_SEARCH_HORIZON_DAYS,
        }
    }
}

fn parse_env<T: std::str::FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} has unparsable value {:?}, using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
