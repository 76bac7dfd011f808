//! Client configuration
//!
//! Persisted with confy as TOML under the `buysearch` app name.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::table::DEFAULT_ROW_CAP;

const APP_NAME: &str = "buysearch";
const CONFIG_NAME: &str = "config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub page_size: u64,
    pub row_cap: usize,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub session_token: Option<String>,
    /// Filter fragment restored on start-up
    pub last_fragment: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".to_string(),
            page_size: 24,
            row_cap: DEFAULT_ROW_CAP,
            poll_interval_secs: 30,
            request_timeout_secs: 15,
            session_token: None,
            last_fragment: None,
        }
    }
}

impl ClientConfig {
    /// Keys accepted by [`ClientConfig::set`].
    pub const KEYS: &'static [&'static str] = &[
        "api_base_url",
        "page_size",
        "row_cap",
        "poll_interval_secs",
        "request_timeout_secs",
    ];

    /// Load the stored config, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "using default configuration");
                Self::default()
            }
        }
    }

    pub fn try_load() -> Result<Self, ConfigError> {
        Ok(confy::load(APP_NAME, CONFIG_NAME)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    pub fn path() -> Option<std::path::PathBuf> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).ok()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Update one setting from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        fn number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
            value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key,
                value: value.to_string(),
            })
        }

        match key {
            "api_base_url" => {
                let url = value.trim();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::InvalidValue {
                        key: "api_base_url",
                        value: value.to_string(),
                    });
                }
                self.api_base_url = url.trim_end_matches('/').to_string();
            }
            "page_size" => self.page_size = number("page_size", value)?,
            "row_cap" => self.row_cap = number("row_cap", value)?,
            "poll_interval_secs" => self.poll_interval_secs = number("poll_interval_secs", value)?,
            "request_timeout_secs" => {
                self.request_timeout_secs = number("request_timeout_secs", value)?
            }
            _ => {
                return Err(ConfigError::UnknownKey {
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: ClientConfig = toml::from_str("page_size = 48\n").unwrap();
        assert_eq!(config.page_size, 48);
        assert_eq!(config.row_cap, DEFAULT_ROW_CAP);
        assert_eq!(config.session_token, None);
    }

    #[test]
    fn test_set_validates() {
        let mut config = ClientConfig::default();
        config.set("page_size", "12").unwrap();
        assert_eq!(config.page_size, 12);

        config.set("api_base_url", "https://shop.example/api/").unwrap();
        assert_eq!(config.api_base_url, "https://shop.example/api");

        assert!(matches!(
            config.set("page_size", "lots"),
            Err(ConfigError::InvalidValue { key: "page_size", .. })
        ));
        assert!(matches!(
            config.set("colour", "red"),
            Err(ConfigError::UnknownKey { .. })
        ));
    }

    #[test]
    fn test_poll_interval_never_zero() {
        let config = ClientConfig {
            poll_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }
}
