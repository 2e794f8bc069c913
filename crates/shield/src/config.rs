//! Configuration loading and validation for the shield service.
//!
//! All values are read from `SHIELD_`-prefixed environment variables at
//! startup. The process will exit with a clear error message if any required
//! variable is missing or invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bearer token accepted by the authenticator. **Required.**
    pub auth_token: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP header used to identify the caller's session.
    #[serde(default = "default_session_header")]
    pub session_header_name: String,

    /// Sessions unused for this many seconds are ended and their keys dropped.
    #[serde(default = "default_session_idle_timeout")]
    pub session_idle_timeout_secs: u64,

    /// How often (seconds) to sweep for idle sessions.
    #[serde(default = "default_session_sweep_interval")]
    pub session_sweep_interval_secs: u64,

    /// Largest accepted input text, in bytes.
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,

    /// OTLP endpoint for span export. Spans are only logged when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    8080
}
fn default_session_header() -> String {
    "X-Session-Id".into()
}
fn default_session_idle_timeout() -> u64 {
    1800
}
fn default_session_sweep_interval() -> u64 {
    60
}
fn default_max_input_bytes() -> usize {
    1024 * 1024
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("SHIELD"))
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.auth_token, "SHIELD_AUTH_TOKEN")?;
        ensure_non_empty(&self.session_header_name, "SHIELD_SESSION_HEADER_NAME")?;
        if let Some(endpoint) = &self.otel_exporter_otlp_endpoint {
            ensure_non_empty(endpoint, "SHIELD_OTEL_EXPORTER_OTLP_ENDPOINT")?;
        }

        if self.session_idle_timeout_secs == 0 {
            anyhow::bail!("SHIELD_SESSION_IDLE_TIMEOUT_SECS must be > 0");
        }
        if self.session_sweep_interval_secs == 0 {
            anyhow::bail!("SHIELD_SESSION_SWEEP_INTERVAL_SECS must be > 0");
        }
        if self.max_input_bytes == 0 {
            anyhow::bail!("SHIELD_MAX_INPUT_BYTES must be > 0");
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        auth_token: "test-token".into(),
        port: default_port(),
        session_header_name: default_session_header(),
        session_idle_timeout_secs: default_session_idle_timeout(),
        session_sweep_interval_secs: default_session_sweep_interval(),
        max_input_bytes: default_max_input_bytes(),
        otel_exporter_otlp_endpoint: None,
        log_level: default_log_level(),
    }
}
