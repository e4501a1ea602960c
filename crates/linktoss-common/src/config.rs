//! Client configuration.

use serde::Deserialize;
use std::path::Path;
use url::Url;

/// Client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Backend API configuration.
    pub api: ApiConfig,
    /// HTTP transport configuration.
    #[serde(default)]
    pub http: HttpConfig,
}

/// Backend API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the LinkToss backend, e.g. `http://localhost:8000`.
    pub base_url: String,
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Total request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("linktoss-rs/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `LINKTOSS_ENV`)
    /// 3. Environment variables with `LINKTOSS_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("LINKTOSS_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("LINKTOSS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("LINKTOSS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Build a configuration for a known base URL, using transport defaults.
    #[must_use]
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.into(),
            },
            http: HttpConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Parse and validate the configured base URL.
    pub fn parsed_base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_http_defaults() {
        let http = HttpConfig::default();
        assert_eq!(http.timeout_secs, 30);
        assert_eq!(http.connect_timeout_secs, 10);
        assert!(http.user_agent.starts_with("linktoss-rs/"));
    }

    #[test]
    fn test_base_url_parsing() {
        let config = Config::for_base_url("http://localhost:8000/");
        let url = config.api.parsed_base_url().unwrap();
        // Url canonicalizes the empty path to "/"
        assert_eq!(url.as_str(), "http://localhost:8000/");
        assert_eq!(url.host_str(), Some("localhost"));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = Config::for_base_url("not a url");
        assert!(config.api.parsed_base_url().is_err());
    }
}
