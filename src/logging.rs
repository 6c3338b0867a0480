//! Logging setup.
//!
//! The library itself only emits `tracing` events; secrets are never part
//! of an event. Applications that do not install their own subscriber can
//! call [`init`] (requires the `tracing-subscriber` feature).
//!
//! # Environment Variables
//!
//! - `SNOWFLAKE_DSN_DEBUG=true|1|yes` - enable debug logging
//! - `SNOWFLAKE_DSN_LOG_LEVEL=trace|debug|info|warn|error` - set the level
//! - `SNOWFLAKE_DSN_LOG_FORMAT=json|pretty|compact` - output format (default: json)
//!
//! ```rust,no_run
//! snowflake_dsn::logging::init();
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

const DEBUG_VAR: &str = "SNOWFLAKE_DSN_DEBUG";
const LEVEL_VAR: &str = "SNOWFLAKE_DSN_LOG_LEVEL";
const FORMAT_VAR: &str = "SNOWFLAKE_DSN_LOG_FORMAT";

/// Check if debug logging is enabled via `SNOWFLAKE_DSN_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var(DEBUG_VAR)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Log level from `SNOWFLAKE_DSN_LOG_LEVEL`.
///
/// Defaults to "debug" if debug logging is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var(LEVEL_VAR) {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// Log format from `SNOWFLAKE_DSN_LOG_FORMAT`.
pub fn get_log_format() -> &'static str {
    env::var(FORMAT_VAR)
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Install a global subscriber filtered to this crate.
///
/// Does nothing unless `SNOWFLAKE_DSN_DEBUG` or `SNOWFLAKE_DSN_LOG_LEVEL`
/// is set. Subsequent calls are no-ops.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var(LEVEL_VAR).is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!("snowflake_dsn={level}"))
                .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            let installed = match get_log_format() {
                "json" => registry.with(fmt::layer().json()).try_init(),
                "compact" => registry.with(fmt::layer().compact()).try_init(),
                _ => registry.with(fmt::layer().pretty()).try_init(),
            };

            if installed.is_ok() {
                tracing::info!(
                    level = level,
                    format = get_log_format(),
                    "snowflake-dsn logging initialized"
                );
            }
        }
    });
}
