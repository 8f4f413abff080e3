use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Poller and transport tuning, loadable from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Delay between ticks until the cloud recommends another one
    #[serde(default = "default_initial_interval_secs")]
    pub initial_interval_secs: u64,

    /// Lower bound applied to server recommended intervals
    #[serde(default = "default_min_interval_secs")]
    pub min_interval_secs: u64,

    /// Upper bound applied to server recommended intervals
    #[serde(default = "default_max_interval_secs")]
    pub max_interval_secs: u64,

    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,

    /// Timeout for a single cloud request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Responses kept by the GraphQL client before evicting the oldest
    #[serde(default = "default_response_cache_capacity")]
    pub response_cache_capacity: usize,
}

fn default_initial_interval_secs() -> u64 {
    15
}

fn default_min_interval_secs() -> u64 {
    1
}

fn default_max_interval_secs() -> u64 {
    3600
}

fn default_event_bus_capacity() -> usize {
    64
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_response_cache_capacity() -> usize {
    crate::services::graphql::DEFAULT_MAX_ENTRIES
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            initial_interval_secs: default_initial_interval_secs(),
            min_interval_secs: default_min_interval_secs(),
            max_interval_secs: default_max_interval_secs(),
            event_bus_capacity: default_event_bus_capacity(),
            request_timeout_secs: default_request_timeout_secs(),
            response_cache_capacity: default_response_cache_capacity(),
        }
    }
}

impl PollerConfig {
    /// Rejects bounds that would make the cadence zero or unsatisfiable.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_interval_secs == 0 {
            return Err("min_interval_secs must be positive".to_string());
        }
        if self.min_interval_secs > self.max_interval_secs {
            return Err(format!(
                "min_interval_secs ({}) exceeds max_interval_secs ({})",
                self.min_interval_secs, self.max_interval_secs
            ));
        }
        if self.initial_interval_secs == 0 {
            return Err("initial_interval_secs must be positive".to_string());
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Load poller configuration from JSON file with environment variable substitution
pub fn load_poller_config(path: &str) -> Result<PollerConfig, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let content = substitute_env_vars(&content)?;

    let config: PollerConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Substitute ${VAR_NAME} with environment variable values
fn substitute_env_vars(content: &str) -> Result<String, regex::Error> {
    let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")?;

    let substituted = re.replace_all(content, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    });

    Ok(substituted.into_owned())
}
