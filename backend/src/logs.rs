//! Pipeline progress logging.
//!
//! Stages report progress as [`LogEntry`] values through the small helper
//! functions below. Entries are emitted as `tracing` events so the binary
//! (or a test harness) decides where they go via [`init_logging`].

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Log level for pipeline progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Optional indentation level (for nested logs)
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Message with its indentation applied.
    pub fn rendered(&self) -> String {
        format!("{}{}", "  ".repeat(self.indent as usize), self.message)
    }
}

/// Emit a log entry.
pub fn log(entry: LogEntry) {
    let message = entry.rendered();
    match entry.level {
        LogLevel::Info => tracing::info!("{}", message),
        LogLevel::Success => tracing::info!(outcome = "success", "{}", message),
        LogLevel::Warning => tracing::warn!("{}", message),
        LogLevel::Error => tracing::error!("{}", message),
    }
}

/// Install the stderr subscriber.
///
/// `RUST_LOG` takes precedence over `verbose`. Calling this more than once
/// keeps the first subscriber.
pub fn init_logging(verbose: bool) {
    let default_directive = if verbose { "layoffs=debug" } else { "layoffs=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    log(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    log(LogEntry::error(msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    log(LogEntry::info(msg).with_indent(indent));
}

pub fn log_success_indent(msg: impl Into<String>, indent: u8) {
    log(LogEntry::success(msg).with_indent(indent));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_rendering() {
        let entry = LogEntry::warning("3 rows purged").with_indent(2);
        assert_eq!(entry.rendered(), "    3 rows purged");
        assert_eq!(entry.level, LogLevel::Warning);
    }

    #[test]
    fn test_entry_json_shape() {
        let json = serde_json::to_value(LogEntry::success("done")).unwrap();
        assert_eq!(json["level"], "success");
        assert_eq!(json["indent"], 0);
    }

    #[test]
    fn test_init_logging_twice_is_harmless() {
        init_logging(false);
        init_logging(true);
        log_info("no panic");
        log_error("still no panic");
    }
}
