//! Logging via `tracing` and `tracing-subscriber`.
//!
//! The terminal belongs to the UI, so events go to a log file rather than
//! stderr. The filter comes from `RUST_LOG` when set, otherwise from the
//! configured level, which `-v` flags replace.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Map `-v` counts onto a filter directive. Without flags the configured
/// directive is used as is.
pub fn effective_level(configured: &str, verbosity: u8) -> String {
    match verbosity {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

fn build_env_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level).with_context(|| format!("invalid log level `{level}`")),
    }
}

/// Install the global subscriber writing to `log_file`.
pub fn init_logging(level: &str, log_file: &Path) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent).context("failed to create log directory")?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;

    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(build_env_filter(level)?)
        .with(layer)
        .try_init()
        .map_err(|err| anyhow!("failed to install log subscriber: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_overrides_configured_level() {
        assert_eq!(effective_level("warn", 0), "warn");
        assert_eq!(effective_level("warn", 1), "debug");
        assert_eq!(effective_level("warn", 3), "trace");
    }

    #[test]
    fn rejects_malformed_levels() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(build_env_filter("improvdb=loud").is_err());
        }
        assert!(build_env_filter("info").is_ok());
    }
}
