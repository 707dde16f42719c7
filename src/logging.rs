//! Debug logging capability for retry notices.
//!
//! The client never installs a global subscriber or reads the environment on its own.
//! Level selection is explicit through [`LogLevel`]; the default [`TracingLogger`]
//! forwards admitted messages to `tracing` under the `failaware` target.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// Sink for the client's debug messages.
pub trait Logger: Send + Sync + fmt::Debug {
    fn debug(&self, message: fmt::Arguments<'_>);
}

/// Verbosity accepted by [`TracingLogger`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LogLevel {
    Panic,
    Fatal,
    #[default]
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Whether debug messages pass at this level.
    pub fn admits_debug(self) -> bool {
        self >= LogLevel::Debug
    }

    /// Read a level from the environment variable `key`. An unset variable yields the default.
    pub fn from_env(key: &str) -> Result<Self, ConfigError> {
        match std::env::var(key) {
            Ok(value) if !value.is_empty() => value.parse(),
            _ => Ok(LogLevel::default()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Panic => "panic",
            LogLevel::Fatal => "fatal",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "panic" => Ok(LogLevel::Panic),
            "fatal" => Ok(LogLevel::Fatal),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(ConfigError::UnknownLogLevel(s.to_string())),
        }
    }
}

/// Default logger: emits `tracing::debug!` events when `level` admits debug.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger {
    level: LogLevel,
}

impl TracingLogger {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }
}

impl Logger for TracingLogger {
    fn debug(&self, message: fmt::Arguments<'_>) {
        if self.level.admits_debug() {
            tracing::debug!(target: "failaware", "{}", message);
        }
    }
}

/// Logger that keeps messages in memory, for assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }
}

impl Logger for RecordingLogger {
    fn debug(&self, message: fmt::Arguments<'_>) {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.to_string());
    }
}
