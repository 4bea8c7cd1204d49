//! Client configuration with environment overrides.
//!
//! Defaults target a local API. Each field can be overridden through a
//! `COURSEMART_*` environment variable; the CLI layers its own flags on top.
//! Blank values are ignored so an exported-but-empty variable never wipes a
//! default. Configuration values are public; do not store secrets here.

use std::path::PathBuf;
use std::time::Duration;

pub const ENV_API_BASE_URL: &str = "COURSEMART_API_BASE_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "COURSEMART_REQUEST_TIMEOUT_SECS";
pub const ENV_VALIDATION_INTERVAL_SECS: &str = "COURSEMART_VALIDATION_INTERVAL_SECS";
pub const ENV_STATE_FILE: &str = "COURSEMART_STATE_FILE";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
/// Default request timeout applied to every API call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// How often an authenticated session re-checks its token.
pub const DEFAULT_VALIDATION_INTERVAL: Duration = Duration::from_secs(60);
/// Minutes before expiry at which a token counts as due for refresh.
pub const DEFAULT_REFRESH_BUFFER_MINUTES: i64 = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub validation_interval: Duration,
    pub refresh_buffer_minutes: i64,
    /// `None` means the platform default location.
    pub state_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            validation_interval: DEFAULT_VALIDATION_INTERVAL,
            refresh_buffer_minutes: DEFAULT_REFRESH_BUFFER_MINUTES,
            state_file: None,
        }
    }
}

impl ClientConfig {
    /// Loads defaults and applies environment overrides.
    #[must_use]
    pub fn load() -> Self {
        let mut config = Self::default();
        apply_overrides(&mut config, env_overrides());
        config
    }

    /// Builder-style override for the API base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_validation_interval(mut self, interval: Duration) -> Self {
        self.validation_interval = interval;
        self
    }
}

#[derive(Default)]
struct Overrides {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    validation_interval_secs: Option<u64>,
    state_file: Option<String>,
}

fn env_overrides() -> Overrides {
    let read = |key: &str| {
        std::env::var(key)
            .ok()
            .and_then(|value| normalize_value(&value))
    };

    Overrides {
        api_base_url: read(ENV_API_BASE_URL),
        request_timeout_secs: read(ENV_REQUEST_TIMEOUT_SECS).and_then(|v| v.parse().ok()),
        validation_interval_secs: read(ENV_VALIDATION_INTERVAL_SECS).and_then(|v| v.parse().ok()),
        state_file: read(ENV_STATE_FILE),
    }
}

fn apply_overrides(config: &mut ClientConfig, overrides: Overrides) {
    if let Some(value) = overrides.api_base_url {
        config.api_base_url = value;
    }
    if let Some(secs) = overrides.request_timeout_secs.filter(|secs| *secs > 0) {
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = overrides.validation_interval_secs.filter(|secs| *secs > 0) {
        config.validation_interval = Duration::from_secs(secs);
    }
    if let Some(value) = overrides.state_file {
        config.state_file = Some(PathBuf::from(value));
    }
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_value_trims_and_rejects_empty() {
        assert_eq!(normalize_value(""), None);
        assert_eq!(normalize_value("   "), None);
        assert_eq!(
            normalize_value("  https://api.coursemart.dev "),
            Some("https://api.coursemart.dev".to_string())
        );
    }

    #[test]
    fn apply_overrides_ignores_missing_and_zero_values() {
        let mut config = ClientConfig::default();
        let overrides = Overrides {
            api_base_url: normalize_value("  "),
            request_timeout_secs: Some(0),
            validation_interval_secs: None,
            state_file: None,
        };

        apply_overrides(&mut config, overrides);

        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn apply_overrides_overwrites_when_present() {
        let mut config = ClientConfig::default();
        let overrides = Overrides {
            api_base_url: normalize_value("https://api.override"),
            request_timeout_secs: Some(3),
            validation_interval_secs: Some(15),
            state_file: normalize_value("/tmp/coursemart.json"),
        };

        apply_overrides(&mut config, overrides);

        assert_eq!(config.api_base_url, "https://api.override");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.validation_interval, Duration::from_secs(15));
        assert_eq!(config.state_file, Some(PathBuf::from("/tmp/coursemart.json")));
    }

    #[test]
    fn load_reads_environment() {
        temp_env::with_vars(
            [
                (ENV_API_BASE_URL, Some("https://api.env.test")),
                (ENV_REQUEST_TIMEOUT_SECS, Some("7")),
                (ENV_VALIDATION_INTERVAL_SECS, Some("not-a-number")),
                (ENV_STATE_FILE, None::<&str>),
            ],
            || {
                let config = ClientConfig::load();
                assert_eq!(config.api_base_url, "https://api.env.test");
                assert_eq!(config.request_timeout, Duration::from_secs(7));
                assert_eq!(config.validation_interval, DEFAULT_VALIDATION_INTERVAL);
                assert_eq!(config.state_file, None);
            },
        );
    }
}
