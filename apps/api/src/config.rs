use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::garden::decay::DecayDefaults;

/// Which `GardenStore` backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub decay_defaults: DecayDefaults,
    pub recorder_max_attempts: u32,
    pub recorder_attempt_timeout: Duration,
    /// Gates the history backfill route. Off unless explicitly enabled.
    pub enable_seed_endpoint: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let store_backend = match optional_env("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => bail!("STORE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        };

        let database_url = match store_backend {
            StoreBackend::Postgres => Some(require_env("DATABASE_URL")?),
            StoreBackend::Memory => optional_env("DATABASE_URL"),
        };

        let defaults = DecayDefaults::default();
        let decay_defaults = DecayDefaults {
            succulent: rate_env("DECAY_RATE_SUCCULENT", defaults.succulent)?,
            fern: rate_env("DECAY_RATE_FERN", defaults.fern)?,
            orchid: rate_env("DECAY_RATE_ORCHID", defaults.orchid)?,
            bonsai: rate_env("DECAY_RATE_BONSAI", defaults.bonsai)?,
        };

        let recorder_max_attempts = parse_env("RECORDER_MAX_ATTEMPTS", 3u32)?;
        if recorder_max_attempts == 0 {
            bail!("RECORDER_MAX_ATTEMPTS must be at least 1");
        }

        Ok(Config {
            store_backend,
            database_url,
            port: parse_env("PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            decay_defaults,
            recorder_max_attempts,
            recorder_attempt_timeout: Duration::from_millis(parse_env(
                "RECORDER_ATTEMPT_TIMEOUT_MS",
                5000u64,
            )?),
            enable_seed_endpoint: parse_env("ENABLE_SEED_ENDPOINT", false)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

fn rate_env(key: &str, default: f64) -> Result<f64> {
    let rate = parse_env(key, default)?;
    if !rate.is_finite() || rate <= 0.0 {
        bail!("{key} must be a positive decay rate, got {rate}");
    }
    Ok(rate)
}
