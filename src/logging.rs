//! Console logging via `tracing-subscriber`, JSON or text, level from config or `RUST_LOG`.

use tracing_subscriber::{fmt::time::UtcTime, prelude::*};

use crate::config::{LogFormat, LoggingConfig};

/// Initializes the global `tracing` subscriber. Safe to call once at startup; a second call
/// (e.g. in a test harness) is a harmless no-op since `try_init` swallows the "already set" error.
pub fn init_with_config(cfg: &LoggingConfig) {
    let env_filter = if let Some(level) = &cfg.level {
        tracing_subscriber::EnvFilter::new(level.as_str())
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    match cfg.format {
        LogFormat::Json => {
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_ansi(false)
                        .with_timer(UtcTime::rfc_3339())
                        .with_writer(std::io::stdout),
                )
                .try_init();
        }
        LogFormat::Text => {
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(true)
                        .with_timer(UtcTime::rfc_3339())
                        .with_writer(std::io::stdout),
                )
                .try_init();
        }
    }
}
