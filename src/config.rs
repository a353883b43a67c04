//! Configuration management for the travel planner
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::PlannerError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the travel planner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Crew engine connection settings
    pub engine: EngineConfig,
    /// Planning session settings
    pub session: SessionConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_server_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Directory holding the form page
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    /// Maximum accepted request body in KiB
    #[serde(default = "default_body_limit_kb")]
    pub body_limit_kb: u32,
    /// PEM certificate; TLS is used when both this and `tls_key` are set
    #[serde(default)]
    pub tls_cert: Option<String>,
    /// PEM private key
    #[serde(default)]
    pub tls_key: Option<String>,
}

/// Crew engine connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the crew engine
    #[serde(default = "default_engine_base_url")]
    pub base_url: String,
    /// Bearer token for the engine (optional)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds; crew runs are slow
    #[serde(default = "default_engine_timeout")]
    pub timeout_seconds: u32,
    /// Ask the engine for verbose agent logs
    #[serde(default = "default_engine_verbose")]
    pub verbose: bool,
}

/// Planning session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sessions idle for longer than this are discarded
    #[serde(default = "default_session_idle_ttl")]
    pub idle_ttl_minutes: u32,
    /// How often expired sessions are purged
    #[serde(default = "default_session_purge_interval")]
    pub purge_interval_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8501
}

fn default_static_dir() -> String {
    "frontend".to_string()
}

fn default_body_limit_kb() -> u32 {
    64
}

fn default_engine_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_engine_timeout() -> u32 {
    300
}

fn default_engine_verbose() -> bool {
    true
}

fn default_session_idle_ttl() -> u32 {
    60
}

fn default_session_purge_interval() -> u32 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            static_dir: default_static_dir(),
            body_limit_kb: default_body_limit_kb(),
            tls_cert: None,
            tls_key: None,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: default_engine_base_url(),
            api_key: None,
            timeout_seconds: default_engine_timeout(),
            verbose: default_engine_verbose(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl_minutes: default_session_idle_ttl(),
            purge_interval_seconds: default_session_purge_interval(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl PlannerConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRAVEL_PLANNER_ENGINE__BASE_URL and friends
        builder = builder.add_source(
            Environment::with_prefix("TRAVEL_PLANNER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: PlannerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("travel-planner").join("config.toml"))
    }

    /// Apply default values to empty or zero configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.static_dir.is_empty() {
            self.server.static_dir = default_static_dir();
        }
        if self.server.body_limit_kb == 0 {
            self.server.body_limit_kb = default_body_limit_kb();
        }
        if self.engine.base_url.is_empty() {
            self.engine.base_url = default_engine_base_url();
        }
        if self.engine.timeout_seconds == 0 {
            self.engine.timeout_seconds = default_engine_timeout();
        }
        if self.session.idle_ttl_minutes == 0 {
            self.session.idle_ttl_minutes = default_session_idle_ttl();
        }
        if self.session.purge_interval_seconds == 0 {
            self.session.purge_interval_seconds = default_session_purge_interval();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_engine()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate engine URL and credentials
    pub fn validate_engine(&self) -> Result<()> {
        if !self.engine.base_url.starts_with("http://")
            && !self.engine.base_url.starts_with("https://")
        {
            return Err(PlannerError::config(
                "Engine base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        if let Some(api_key) = &self.engine.api_key {
            if api_key.trim().is_empty() {
                return Err(PlannerError::config(
                    "Engine API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(PlannerError::config("Server port cannot be 0").into());
        }

        if self.server.body_limit_kb > 10_240 {
            return Err(
                PlannerError::config("Request body limit cannot exceed 10240 KiB").into(),
            );
        }

        if self.engine.timeout_seconds > 1800 {
            return Err(PlannerError::config(
                "Engine timeout cannot exceed 1800 seconds",
            )
            .into());
        }

        if self.session.idle_ttl_minutes > 24 * 60 {
            return Err(PlannerError::config(
                "Session idle TTL cannot exceed 1440 minutes (1 day)",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PlannerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PlannerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if self.server.tls_cert.is_some() != self.server.tls_key.is_some() {
            return Err(PlannerError::config(
                "TLS needs both server.tls_cert and server.tls_key",
            )
            .into());
        }

        Ok(())
    }

    /// Address the server binds to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
