//! Client options and their resolution against the defaults.
//!
//! Each field is resolved on its own: a field left at its zero value (`0`,
//! `Duration::ZERO`, `None`) takes the default, anything else is kept. Zero is therefore
//! not an expressible explicit value for the numeric options.

use crate::logging::{LogLevel, Logger, TracingLogger};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: usize = 3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_BACK_OFF_DELAY_FACTOR: Duration = Duration::from_secs(1);

/// Options for a [`Client`](crate::Client).
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Options {
    /// Total attempts per call, the first one included.
    pub max_retries: usize,
    /// Deadline for each individual attempt.
    pub timeout: Duration,
    /// Base unit of the exponential backoff.
    pub back_off_delay_factor: Duration,
    /// Retain a record of every attempt in the failure result.
    pub keep_log: bool,
    /// Level used by the default logger.
    pub log_level: LogLevel,
    /// Sink for debug messages; defaults to a [`TracingLogger`] at `log_level`.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub logger: Option<Arc<dyn Logger>>,
}

impl Options {
    /// `{max_retries: 3, timeout: 1s, back_off_delay_factor: 1s, keep_log: false}`.
    pub fn defaults() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: DEFAULT_TIMEOUT,
            back_off_delay_factor: DEFAULT_BACK_OFF_DELAY_FACTOR,
            keep_log: false,
            log_level: LogLevel::default(),
            logger: None,
        }
    }

    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn back_off_delay_factor(mut self, factor: Duration) -> Self {
        self.back_off_delay_factor = factor;
        self
    }

    pub fn keep_log(mut self, keep_log: bool) -> Self {
        self.keep_log = keep_log;
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn logger<L>(mut self, logger: L) -> Self
    where
        L: Logger + 'static,
    {
        self.logger = Some(Arc::new(logger));
        self
    }

    /// Merge with [`Options::defaults`] field by field.
    pub fn resolve(self) -> Self {
        let defaults = Self::defaults();
        Self {
            max_retries: if self.max_retries == 0 {
                defaults.max_retries
            } else {
                self.max_retries
            },
            timeout: if self.timeout.is_zero() { defaults.timeout } else { self.timeout },
            back_off_delay_factor: if self.back_off_delay_factor.is_zero() {
                defaults.back_off_delay_factor
            } else {
                self.back_off_delay_factor
            },
            keep_log: self.keep_log,
            log_level: self.log_level,
            logger: self.logger,
        }
    }

    /// The configured logger, or the default one for `log_level`.
    pub(crate) fn effective_logger(&self) -> Arc<dyn Logger> {
        match &self.logger {
            Some(logger) => logger.clone(),
            None => Arc::new(TracingLogger::new(self.log_level)),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("max_retries", &self.max_retries)
            .field("timeout", &self.timeout)
            .field("back_off_delay_factor", &self.back_off_delay_factor)
            .field("keep_log", &self.keep_log)
            .field("log_level", &self.log_level)
            .field("logger", &self.logger.as_ref().map(|_| "<logger>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::RecordingLogger;

    #[test]
    fn zero_fields_take_defaults() {
        let resolved = Options::default().resolve();
        assert_eq!(resolved.max_retries, 3);
        assert_eq!(resolved.timeout, Duration::from_secs(1));
        assert_eq!(resolved.back_off_delay_factor, Duration::from_secs(1));
        assert!(!resolved.keep_log);
        assert!(resolved.logger.is_none());
    }

    #[test]
    fn merge_is_per_field() {
        let resolved = Options::default()
            .timeout(Duration::from_millis(10))
            .keep_log(true)
            .resolve();
        assert_eq!(resolved.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(resolved.timeout, Duration::from_millis(10));
        assert_eq!(resolved.back_off_delay_factor, DEFAULT_BACK_OFF_DELAY_FACTOR);
        assert!(resolved.keep_log);

        let resolved = Options::default().max_retries(7).resolve();
        assert_eq!(resolved.max_retries, 7);
        assert_eq!(resolved.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn explicit_values_survive() {
        let resolved = Options::default()
            .max_retries(5)
            .timeout(Duration::from_millis(250))
            .back_off_delay_factor(Duration::from_millis(5))
            .log_level(LogLevel::Debug)
            .resolve();
        assert_eq!(resolved.max_retries, 5);
        assert_eq!(resolved.timeout, Duration::from_millis(250));
        assert_eq!(resolved.back_off_delay_factor, Duration::from_millis(5));
        assert_eq!(resolved.log_level, LogLevel::Debug);
    }

    #[test]
    fn injected_logger_is_used() {
        let recorder = RecordingLogger::new();
        let opts = Options::default().logger(recorder.clone()).resolve();
        opts.effective_logger().debug(format_args!("hello"));
        assert_eq!(recorder.messages(), vec!["hello".to_string()]);
    }

    #[test]
    fn debug_hides_logger() {
        let text = format!("{:?}", Options::defaults().logger(RecordingLogger::new()));
        assert!(text.contains("<logger>"));
        assert!(text.contains("max_retries: 3"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_partial_options() {
        let opts: Options = serde_json::from_str(
            r#"{"max_retries": 5, "keep_log": true, "log_level": "debug"}"#,
        )
        .unwrap();
        let resolved = opts.resolve();
        assert_eq!(resolved.max_retries, 5);
        assert!(resolved.keep_log);
        assert_eq!(resolved.log_level, LogLevel::Debug);
        assert_eq!(resolved.timeout, DEFAULT_TIMEOUT);
    }
}
