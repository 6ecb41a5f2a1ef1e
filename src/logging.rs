// 📜 Structured logging - tracing subscriber setup
//
// RUST_LOG overrides the default level. The terminal UI owns stdout/stderr,
// so it sends logs to a file; the server and one-shot commands use stderr.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output
    Pretty,
    /// JSON lines
    Json,
}

impl LogFormat {
    /// Accepts "json" or "pretty" (case-insensitive), anything else is Pretty
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Where log lines go.
#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
}

/// Install the global subscriber. Call once, early in `main()`.
///
/// A second call is ignored (the first subscriber stays installed).
pub fn init_logging(default_level: &str, format: LogFormat, target: LogTarget<'_>) -> std::io::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let result = match (format, target) {
        (LogFormat::Pretty, LogTarget::Stderr) => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        (LogFormat::Json, LogTarget::Stderr) => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true))
            .try_init(),
        (format, LogTarget::File(path)) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let writer = Mutex::new(file);
            match format {
                LogFormat::Pretty => tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(true))
                    .try_init(),
                LogFormat::Json => tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().json().with_writer(writer).with_target(true))
                    .try_init(),
            }
        }
    };

    if result.is_ok() {
        tracing::info!(?format, "logging initialized");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str_lossy("json"), LogFormat::Json);
        assert_eq!(LogFormat::from_str_lossy(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::from_str_lossy("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str_lossy("xml"), LogFormat::Pretty);
    }
}
