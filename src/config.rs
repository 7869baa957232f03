//! # Configuration
//!
//! Layered runtime settings: built-in defaults, an optional config file and
//! `CINECOMPARE_`-prefixed environment variables, the last source winning.
//!
//! The provider set lives here, not in code: `providers` is an ordered list
//! of upstream provider names, each served under the shared `upstream`
//! base URL with the shared access token.
//!
//! # Examples
//!
//! ```
//! use cinecompare::config::Settings;
//!
//! let settings = Settings::default();
//! assert_eq!(settings.server.port, 8080);
//! assert_eq!(settings.providers, vec!["cinemaworld", "filmworld"]);
//! ```

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// HTTP server binding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerSettings {
    /// Returns the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Upstream provider API access.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
    /// Base URL shared by every provider; the provider name is appended as
    /// the first path segment.
    pub base_url: String,
    /// Access token sent as `x-access-token` on every request. Empty means
    /// no token header.
    pub access_token: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: "https://webjetapitest.azurewebsites.net/api".to_string(),
            access_token: String::new(),
            timeout_ms: 10_000,
        }
    }
}

impl UpstreamSettings {
    /// Returns the per-request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Engine tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Maximum merged items having offers populated at once.
    pub max_in_flight_details: usize,
    /// Coalesce concurrent cold-cache fetches per provider.
    pub single_flight: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_in_flight_details: 5,
            single_flight: false,
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP server binding.
    pub server: ServerSettings,
    /// Upstream API access.
    pub upstream: UpstreamSettings,
    /// Ordered provider names; order decides offer order and native-ID
    /// fallbacks in projections.
    pub providers: Vec<String>,
    /// Engine tuning.
    pub engine: EngineSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            upstream: UpstreamSettings::default(),
            providers: vec!["cinemaworld".to_string(), "filmworld".to_string()],
            engine: EngineSettings::default(),
        }
    }
}

impl Settings {
    /// Loads settings from `cinecompare.toml` (optional) and the
    /// environment (`CINECOMPARE_UPSTREAM__ACCESS_TOKEN=...`,
    /// `CINECOMPARE_PROVIDERS=cinemaworld,filmworld`, ...).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a source exists but cannot be parsed
    /// or a value has the wrong shape.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("cinecompare").required(false))
            .add_source(
                Environment::with_prefix("CINECOMPARE")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("providers"),
            )
            .build()?
            .try_deserialize()
            .map(Settings::or_defaults)
    }

    fn or_defaults(mut self) -> Self {
        if self.providers.is_empty() {
            self.providers = Settings::default().providers;
        }
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn defaults_cover_the_known_providers() {
        let settings = Settings::default();
        assert_eq!(settings.server.bind_addr(), "0.0.0.0:8080");
        assert_eq!(settings.providers, vec!["cinemaworld", "filmworld"]);
        assert_eq!(settings.upstream.timeout(), Duration::from_secs(10));
        assert_eq!(settings.engine.max_in_flight_details, 5);
        assert!(!settings.engine.single_flight);
    }

    #[test]
    fn file_values_override_defaults() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(
                r#"
                providers = ["cinemaworld", "filmworld", "streamworld"]

                [server]
                port = 9090

                [upstream]
                access_token = "sekrit"
                timeout_ms = 2500

                [engine]
                max_in_flight_details = 3
                single_flight = true
                "#,
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.providers.len(), 3);
        assert_eq!(settings.upstream.access_token, "sekrit");
        assert_eq!(settings.upstream.timeout(), Duration::from_millis(2500));
        assert_eq!(settings.engine.max_in_flight_details, 3);
        assert!(settings.engine.single_flight);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str("[server]\nport = 3000", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.port, 3000);
        assert_eq!(
            settings.upstream.base_url,
            "https://webjetapitest.azurewebsites.net/api"
        );
    }
}
