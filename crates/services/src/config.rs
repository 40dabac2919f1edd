use std::env;
use std::time::Duration;

use mathiter_core::TimerConfig;
use mathiter_core::timer::DEFAULT_DURATION_SECS;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5001";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_BASE_URL: &str = "MATHITER_API_BASE_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "MATHITER_REQUEST_TIMEOUT_SECS";
pub const ENV_TEST_DURATION_SECS: &str = "MATHITER_TEST_DURATION_SECS";

/// Where the backend lives and how long a test runs.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    base_url: Url,
    pub request_timeout: Duration,
    pub test_duration_secs: u32,
}

impl ApiConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not an absolute http(s)-style url.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            test_duration_secs: DEFAULT_DURATION_SECS,
        })
    }

    /// Read `MATHITER_*` variables, falling back to defaults when unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a malformed url or number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env` over an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a malformed url or number.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(ENV_API_BASE_URL)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.into());
        let mut config = Self::new(&base_url)?;

        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            let secs = parse_positive(ENV_REQUEST_TIMEOUT_SECS, &raw)?;
            config.request_timeout = Duration::from_secs(u64::from(secs));
        }
        if let Some(raw) = lookup(ENV_TEST_DURATION_SECS) {
            config.test_duration_secs = parse_positive(ENV_TEST_DURATION_SECS, &raw)?;
        }
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not a usable base url.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_test_duration(mut self, secs: u32) -> Self {
        self.test_duration_secs = secs;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path below the base url, keeping any path prefix.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if the joined url is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path.trim_start_matches('/'))
    }

    #[must_use]
    pub fn timer_config(&self) -> TimerConfig {
        TimerConfig::default().with_duration(self.test_duration_secs)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidBaseUrl {
        raw: raw.to_owned(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::NotABase(raw.to_owned()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_positive(var: &'static str, raw: &str) -> Result<u32, ConfigError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| ConfigError::InvalidNumber {
            var,
            raw: raw.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url().as_str(), "http://localhost:5001/");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.test_duration_secs, 1800);
        assert_eq!(config.timer_config().warning_secs, 300);
    }

    #[test]
    fn endpoint_keeps_path_prefix() {
        let config = ApiConfig::new("https://example.test/backend").unwrap();
        assert_eq!(
            config.endpoint("/api/adaptive-test/start").unwrap().as_str(),
            "https://example.test/backend/api/adaptive-test/start"
        );
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[
            (ENV_API_BASE_URL, "http://10.0.0.5:8080"),
            (ENV_REQUEST_TIMEOUT_SECS, "5"),
            (ENV_TEST_DURATION_SECS, "600"),
        ]))
        .unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.timer_config().duration_secs, 600);
        assert_eq!(
            config.endpoint("get_test_problems").unwrap().as_str(),
            "http://10.0.0.5:8080/get_test_problems"
        );
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(matches!(
            ApiConfig::from_lookup(lookup(&[(ENV_TEST_DURATION_SECS, "0")])),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            ApiConfig::new("not a url"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            ApiConfig::new("mailto:someone@example.test"),
            Err(ConfigError::NotABase(_))
        ));
    }
}
