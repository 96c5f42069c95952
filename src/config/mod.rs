//! Typed configuration from environment variables.
//!
//! Loads once at startup and fails fast on malformed values. Everything has
//! a default, so an empty environment yields a working service.

use crate::error::{Error, Result};
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8081";
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_IDLE_BACKOFF: Duration = Duration::from_secs(1);
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Upper bound for every configured duration (one year).
pub const MAX_DURATION_MS: u64 = 365 * 24 * 60 * 60 * 1000;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub engine: EngineConfig,
    /// How long the HTTP server gets to finish in-flight requests once the
    /// queue has drained.
    pub shutdown_grace: Duration,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

/// Timing knobs for the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Minimum age a job must reach before it is hashed.
    pub min_delay: Duration,
    /// Upper bound on how long an idle worker sleeps between queue checks.
    pub idle_backoff: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_delay: DEFAULT_MIN_DELAY,
            idle_backoff: DEFAULT_IDLE_BACKOFF,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        let raw_addr = optional_var("HASHQ_LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = raw_addr.parse::<SocketAddr>().map_err(|e| {
            Error::Config(format!(
                "HASHQ_LISTEN_ADDR {raw_addr:?} is not a socket address: {e}"
            ))
        })?;

        Ok(Self {
            listen_addr,
            engine: EngineConfig {
                min_delay: millis_var("HASHQ_MIN_DELAY_MS", DEFAULT_MIN_DELAY)?,
                idle_backoff: millis_var("HASHQ_IDLE_BACKOFF_MS", DEFAULT_IDLE_BACKOFF)?,
            },
            shutdown_grace: millis_var("HASHQ_SHUTDOWN_GRACE_MS", DEFAULT_SHUTDOWN_GRACE)?,
            otel_endpoint: optional_var("OTEL_ENDPOINT"),
            log_level: optional_var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn millis_var(name: &str, default: Duration) -> Result<Duration> {
    let Some(raw) = optional_var(name) else {
        return Ok(default);
    };
    let ms = raw.trim().parse::<u64>().map_err(|e| {
        Error::Config(format!(
            "{name} must be a whole number of milliseconds, got {raw:?}: {e}"
        ))
    })?;
    if ms > MAX_DURATION_MS {
        return Err(Error::Config(format!(
            "{name} must be at most {MAX_DURATION_MS} ms, got {ms}"
        )));
    }
    Ok(Duration::from_millis(ms))
}
