//! Engine logging
//!
//! Every subsystem reports through the `engine_*` macros, which forward to the
//! logger installed in [`Engine`](crate::twilight::Engine). Error entries carry
//! the file and line of the call site so fatal GPU failures can be located.

use chrono::{DateTime, Local};
use colored::*;
use std::time::SystemTime;

/// Sink for engine log entries
///
/// Install a custom one with `Engine::set_logger` to capture output in a file
/// or an in-game console.
///
/// # Example
///
/// ```no_run
/// use twilight_engine::twilight::log::{Logger, LogEntry};
///
/// struct QuietLogger;
///
/// impl Logger for QuietLogger {
///     fn log(&self, _entry: &LogEntry) {}
/// }
/// ```
pub trait Logger: Send + Sync {
    fn log(&self, entry: &LogEntry);
}

/// One log record
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub severity: LogSeverity,

    pub timestamp: SystemTime,

    /// Emitting component, e.g. "twilight::FrameScheduler"
    pub source: String,

    pub message: String,

    /// Call site, only filled for detailed (error) entries
    pub file: Option<&'static str>,

    pub line: Option<u32>,
}

/// Log severity levels, ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogSeverity {
    /// Fixed-width label used in console output
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }
}

/// Render an entry without colors: `[ts] [SEVERITY] [source] message (file:line)`
pub fn format_entry(entry: &LogEntry) -> String {
    let datetime: DateTime<Local> = entry.timestamp.into();
    let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f");
    let mut text = format!(
        "[{}] [{}] [{}] {}",
        timestamp,
        entry.severity.label(),
        entry.source,
        entry.message
    );
    if let (Some(file), Some(line)) = (entry.file, entry.line) {
        text.push_str(&format!(" ({}:{})", file, line));
    }
    text
}

/// Colored console logger
///
/// Entries below `min_severity` are dropped. Errors go to stderr, everything
/// else to stdout.
pub struct DefaultLogger {
    pub min_severity: LogSeverity,
}

impl Default for DefaultLogger {
    fn default() -> Self {
        Self { min_severity: LogSeverity::Debug }
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.severity < self.min_severity {
            return;
        }

        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let severity = match entry.severity {
            LogSeverity::Trace => entry.severity.label().bright_black(),
            LogSeverity::Debug => entry.severity.label().cyan(),
            LogSeverity::Info => entry.severity.label().green(),
            LogSeverity::Warn => entry.severity.label().yellow(),
            LogSeverity::Error => entry.severity.label().red().bold(),
        };
        let source = entry.source.bright_blue();

        match (entry.file, entry.line) {
            (Some(file), Some(line)) => eprintln!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp, severity, source, entry.message, file, line
            ),
            _ if entry.severity == LogSeverity::Error => eprintln!(
                "[{}] [{}] [{}] {}",
                timestamp, severity, source, entry.message
            ),
            _ => println!(
                "[{}] [{}] [{}] {}",
                timestamp, severity, source, entry.message
            ),
        }
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message
#[macro_export]
macro_rules! engine_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::twilight::Engine::log(
            $crate::twilight::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a DEBUG message
#[macro_export]
macro_rules! engine_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::twilight::Engine::log(
            $crate::twilight::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an INFO message
///
/// # Example
///
/// ```no_run
/// twilight_engine::engine_info!("twilight::Renderer", "Swapchain recreated at {}x{}", 800, 600);
/// ```
#[macro_export]
macro_rules! engine_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::twilight::Engine::log(
            $crate::twilight::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a WARN message (soft failures land here)
#[macro_export]
macro_rules! engine_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::twilight::Engine::log(
            $crate::twilight::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an ERROR message with file:line information
#[macro_export]
macro_rules! engine_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::twilight::Engine::log_detailed(
            $crate::twilight::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
