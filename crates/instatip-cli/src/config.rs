//! Application Configuration
//!
//! Layered configuration for the InstaTip CLI: optional file, `config/default`,
//! `config/local`, then `INSTATIP__*` environment variables.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use instatip_session::SessionConfig;
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Session limits and defaults
    #[serde(default)]
    pub session: SessionConfig,

    /// Settlement boundary policy
    #[serde(default)]
    pub settlement: SettlementSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settlement settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementSettings {
    /// How long the application waits on the settlement network
    #[serde(default = "default_settlement_timeout")]
    pub timeout_secs: u64,
}

impl Default for SettlementSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_settlement_timeout(),
        }
    }
}

impl SettlementSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins if set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_settlement_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::load_from(Path::new("."), config_path)
    }

    /// Layer `config/default`, `config/local` (relative to `base_dir`), the
    /// explicit file, then environment variables. Later sources win.
    pub fn load_from(base_dir: &Path, config_path: Option<&str>) -> anyhow::Result<Self> {
        let layer = |name: &str| {
            base_dir
                .join("config")
                .join(name)
                .to_string_lossy()
                .into_owned()
        };

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(&layer("default")).required(false))
            .add_source(config::File::with_name(&layer("local")).required(false));

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("INSTATIP")
                .separator("__")
                .try_parsing(true),
        );

        let app_config: AppConfig = builder
            .build()?
            .try_deserialize()
            .context("invalid configuration")?;
        app_config
            .session
            .validate()
            .context("invalid session configuration")?;

        Ok(app_config)
    }
}
