//! Configuration for the metering service.
//!
//! Configured via a TOML file, with support for environment variable
//! interpolation using `${VAR_NAME}` syntax.
//!
//! # Example
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 3333
//!
//! [aws]
//! region = "us-east-1"
//!
//! [metering]
//! stream_name = "usage-events"
//! database = "billing"
//! output_location = "s3://meterd-query-output"
//! ```

mod aws;
mod metering;
mod observability;
mod server;

use std::path::Path;

pub use aws::*;
pub use metering::*;
pub use observability::*;
use serde::{Deserialize, Serialize};
pub use server::*;

/// Root configuration. All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeterConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// AWS client configuration (region, endpoint overrides).
    #[serde(default)]
    pub aws: AwsConfig,

    /// Stream, database, and query settings for the metering pipeline.
    #[serde(default)]
    pub metering: MeteringConfig,

    /// Observability configuration (logging).
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl MeterConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;
        let config: MeterConfig = toml::from_str(&expanded).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for consistency and completeness.
    fn validate(&self) -> Result<(), ConfigError> {
        let metering = &self.metering;
        for (field, value) in [
            ("metering.stream_name", &metering.stream_name),
            ("metering.database", &metering.database),
            ("metering.table", &metering.table),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Validation(format!("{field} must not be empty")));
            }
        }

        if !metering.output_location.starts_with("s3://") {
            return Err(ConfigError::Validation(
                "metering.output_location must be an s3:// URI".to_string(),
            ));
        }

        if metering.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "metering.poll_interval_secs must be at least 1".to_string(),
            ));
        }

        if metering.query_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "metering.query_timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Expand `${VAR_NAME}` references against the process environment.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("static regex");
    let mut result = String::with_capacity(input.len());
    let mut last_end = 0;

    for cap in re.captures_iter(input) {
        let whole = cap.get(0).expect("capture group 0");
        result.push_str(&input[last_end..whole.start()]);

        let var_name = &cap[1];
        let value = std::env::var(var_name)
            .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
        result.push_str(&value);

        last_end = whole.end();
    }

    result.push_str(&input[last_end..]);
    Ok(result)
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
