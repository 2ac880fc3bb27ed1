use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";
pub const DEFAULT_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Opensearch endpoint queried for suggestions.
    pub endpoint: String,
    /// Quiet period before a request fires.
    pub delay: Duration,
    /// Fire at the start of a quiet window instead of the end.
    pub leading: bool,
    /// Ask intermediaries not to serve cached responses.
    pub no_cache: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            delay: DEFAULT_DELAY,
            leading: false,
            no_cache: true,
        }
    }
}

impl SearchConfig {
    /// Defaults overridden by `SOKUSUGGEST_ENDPOINT`, `SOKUSUGGEST_DELAY_MS`
    /// and `SOKUSUGGEST_LEADING`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("SOKUSUGGEST_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(delay) = lookup("SOKUSUGGEST_DELAY_MS") {
            let ms = delay
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidDelay(delay.clone()))?;
            config.delay = Duration::from_millis(ms);
        }
        if let Some(leading) = lookup("SOKUSUGGEST_LEADING") {
            config.leading = parse_flag("SOKUSUGGEST_LEADING", &leading)?;
        }

        Ok(config)
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: value.to_string(),
        }),
    }
}
