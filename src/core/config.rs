//! Client configuration.
//!
//! Native builds load it with `ClientConfig::from_env()?` after calling
//! `dotenvy::dotenv()`. In the browser `ClientConfig::default()` points at the
//! same-origin `/api` prefix.

/// Default API base URL for native builds
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
/// Default API base URL in the browser (same origin)
pub const BROWSER_API_URL: &str = "/api";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REFRESH_SKEW_SECS: i64 = 30;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("API base URL must not be empty")]
    MissingApiUrl,

    #[error("Request timeout must be at least one second")]
    ZeroTimeout,

    #[error("Refresh window must not be negative")]
    NegativeRefreshSkew,
}

/// Marketplace client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every API path is appended to
    /// Example: https://market.example.com/api
    pub api_base_url: String,

    /// Per-request timeout (native transport only)
    pub request_timeout_secs: u64,

    /// Refresh proactively when the access token expires within this window
    pub refresh_skew_secs: i64,

    /// Ask the server to verify a restored token at startup
    pub verify_on_startup: bool,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            refresh_skew_secs: DEFAULT_REFRESH_SKEW_SECS,
            verify_on_startup: true,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Unset values fall back to their defaults; unparsable ones are errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::new(DEFAULT_API_URL);
        let config = Self {
            api_base_url: lookup("MARKETPLACE_API_URL").unwrap_or(defaults.api_base_url),
            request_timeout_secs: parse_var(&lookup, "MARKETPLACE_REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout_secs),
            refresh_skew_secs: parse_var(&lookup, "MARKETPLACE_REFRESH_SKEW_SECS")?
                .unwrap_or(defaults.refresh_skew_secs),
            verify_on_startup: parse_var(&lookup, "MARKETPLACE_VERIFY_ON_STARTUP")?
                .unwrap_or(defaults.verify_on_startup),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the values make sense together
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::MissingApiUrl);
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.refresh_skew_secs < 0 {
            return Err(ConfigError::NegativeRefreshSkew);
        }
        Ok(())
    }

    /// Set request timeout
    pub fn request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Set proactive refresh window
    pub fn refresh_skew(mut self, secs: i64) -> Self {
        self.refresh_skew_secs = secs;
        self
    }

    /// Enable or disable startup verification
    pub fn verify_on_startup(mut self, verify: bool) -> Self {
        self.verify_on_startup = verify;
        self
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim().parse().map(Some).map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw,
    })
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(BROWSER_API_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.api_base_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.refresh_skew_secs, 30);
        assert!(config.verify_on_startup);
    }

    #[test]
    fn test_values_from_env() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("MARKETPLACE_API_URL", "https://market.example.com/api"),
            ("MARKETPLACE_REQUEST_TIMEOUT_SECS", "5"),
            ("MARKETPLACE_REFRESH_SKEW_SECS", "60"),
            ("MARKETPLACE_VERIFY_ON_STARTUP", "false"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "https://market.example.com/api");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.refresh_skew_secs, 60);
        assert!(!config.verify_on_startup);
    }

    #[test]
    fn test_unparsable_value_is_rejected() {
        let err = ClientConfig::from_lookup(lookup_from(&[
            ("MARKETPLACE_REQUEST_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();

        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "MARKETPLACE_REQUEST_TIMEOUT_SECS".to_string(),
                value: "soon".to_string(),
            }
        );
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let err = ClientConfig::from_lookup(lookup_from(&[("MARKETPLACE_API_URL", " ")]));
        assert_eq!(err, Err(ConfigError::MissingApiUrl));

        let err = ClientConfig::from_lookup(lookup_from(&[
            ("MARKETPLACE_REQUEST_TIMEOUT_SECS", "0"),
        ]));
        assert_eq!(err, Err(ConfigError::ZeroTimeout));

        let err = ClientConfig::from_lookup(lookup_from(&[
            ("MARKETPLACE_REFRESH_SKEW_SECS", "-5"),
        ]));
        assert_eq!(err, Err(ConfigError::NegativeRefreshSkew));
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new("http://api.test")
            .request_timeout(10)
            .refresh_skew(0)
            .verify_on_startup(false);

        assert_eq!(config.api_base_url, "http://api.test");
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.refresh_skew_secs, 0);
        assert!(!config.verify_on_startup);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_browser_default() {
        assert_eq!(ClientConfig::default().api_base_url, BROWSER_API_URL);
        assert_eq!(ClientConfig::default().validate(), Ok(()));
    }
}
