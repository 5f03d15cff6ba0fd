//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (CAMPUS_*)
//! 2. TOML config file (if CAMPUS_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The hosting environment is an explicit setting here; nothing inspects the
//! hostname at runtime.

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Where the JSON collections are served from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Same-origin dynamic API server.
    Development,
    /// Pre-rendered JSON files on static hosting.
    #[default]
    Production,
}

impl Environment {
    pub fn is_dev(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// What a 401 response turns into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnauthorizedPolicy {
    /// Resolve the query with `null`.
    ReturnEmpty,
    /// Fail the query with `ErrorKind::Unauthorized`.
    #[default]
    Raise,
}

/// Candidate order for extension-less paths on static hosting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FallbackOrder {
    /// `path.json` first, then `path`.
    #[default]
    JsonFirst,
    /// `path` first, then `path.json`.
    RawFirst,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (CAMPUS_*)
/// 2. TOML config file (if CAMPUS_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin the `/api/*` paths are resolved against.
    ///
    /// Set via CAMPUS_BASE_URL environment variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Development (dynamic API) or production (static JSON).
    ///
    /// Set via CAMPUS_ENVIRONMENT environment variable.
    #[serde(default)]
    pub environment: Environment,

    /// Handling of 401 responses: `returnEmpty` or `raise`.
    ///
    /// Set via CAMPUS_ON_UNAUTHORIZED environment variable.
    #[serde(default)]
    pub on_unauthorized: UnauthorizedPolicy,

    /// Candidate order on static hosting: `jsonFirst` or `rawFirst`.
    ///
    /// Set via CAMPUS_FALLBACK_ORDER environment variable.
    #[serde(default)]
    pub fallback_order: FallbackOrder,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via CAMPUS_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds. Unset leaves the transport default.
    ///
    /// Set via CAMPUS_TIMEOUT_MS environment variable.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Age after which a cached collection is refetched. Unset means never.
    ///
    /// Set via CAMPUS_STALE_TIME_MS environment variable.
    #[serde(default)]
    pub stale_time_ms: Option<u64>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".into()
}

fn default_user_agent() -> String {
    "campus/0.1".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            environment: Environment::default(),
            on_unauthorized: UnauthorizedPolicy::default(),
            fallback_order: FallbackOrder::default(),
            user_agent: default_user_agent(),
            timeout_ms: None,
            stale_time_ms: None,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Stale time as Duration; `None` is infinite.
    pub fn stale_time(&self) -> Option<Duration> {
        self.stale_time_ms.map(Duration::from_millis)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `CAMPUS_`
    /// 2. TOML file from `CAMPUS_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("CAMPUS_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("CAMPUS_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.on_unauthorized, UnauthorizedPolicy::Raise);
        assert_eq!(config.fallback_order, FallbackOrder::JsonFirst);
        assert_eq!(config.user_agent, "campus/0.1");
        assert!(config.timeout().is_none());
        assert!(config.stale_time().is_none());
    }

    #[test]
    fn test_load_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env("CAMPUS_BASE_URL", "https://www.example.edu");
            jail.set_env("CAMPUS_ENVIRONMENT", "development");
            jail.set_env("CAMPUS_ON_UNAUTHORIZED", "returnEmpty");
            jail.set_env("CAMPUS_TIMEOUT_MS", "5000");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.base_url, "https://www.example.edu");
            assert!(config.environment.is_dev());
            assert_eq!(config.on_unauthorized, UnauthorizedPolicy::ReturnEmpty);
            assert_eq!(config.timeout(), Some(Duration::from_millis(5000)));
            Ok(())
        });
    }

    #[test]
    fn test_load_from_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "campus.toml",
                r#"
                environment = "production"
                fallback_order = "rawFirst"
                stale_time_ms = 60000
                "#,
            )?;
            jail.set_env("CAMPUS_CONFIG_FILE", "campus.toml");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.fallback_order, FallbackOrder::RawFirst);
            assert_eq!(config.stale_time(), Some(Duration::from_secs(60)));
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("campus.toml", r#"user_agent = "from-file""#)?;
            jail.set_env("CAMPUS_CONFIG_FILE", "campus.toml");
            jail.set_env("CAMPUS_USER_AGENT", "from-env");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.user_agent, "from-env");
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_environment() {
        Jail::expect_with(|jail| {
            jail.set_env("CAMPUS_ENVIRONMENT", "staging");
            assert!(matches!(AppConfig::load(), Err(ConfigError::LoadFailed(_))));
            Ok(())
        });
    }
}
