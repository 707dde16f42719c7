//! Attempt log and the structured failure returned on exhaustion or cancellation.

use crate::classify::AttemptFailure;
use bytes::Bytes;
use http::{HeaderMap, Response, StatusCode, Version};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Status line, headers and body of a response seen during an attempt.
#[derive(Debug, Clone)]
pub struct ResponseSnapshot {
    pub status: StatusCode,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ResponseSnapshot {
    pub fn of(response: &Response<Bytes>) -> Self {
        Self {
            status: response.status(),
            version: response.version(),
            headers: response.headers().clone(),
            body: response.body().clone(),
        }
    }
}

/// One attempt within a single call.
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    /// 1-based attempt number.
    pub number: usize,
    pub error: Option<AttemptFailure>,
    pub response: Option<ResponseSnapshot>,
    pub started_at: Instant,
    pub finished_at: Instant,
    /// Wait that followed this attempt, if another attempt was scheduled.
    pub backoff: Option<Duration>,
}

impl AttemptRecord {
    pub fn duration(&self) -> Duration {
        self.finished_at.saturating_duration_since(self.started_at)
    }
}

impl fmt::Display for AttemptRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ", self.number)?;
        match (&self.error, &self.response) {
            (Some(err), _) => write!(f, "failed: {}", err)?,
            (None, Some(rsp)) => write!(f, "status {}", rsp.status)?,
            (None, None) => write!(f, "no outcome")?,
        }
        write!(f, " after {:?}", self.duration())?;
        if let Some(wait) = self.backoff {
            write!(f, ", waited {:?}", wait)?;
        }
        Ok(())
    }
}

/// Structured terminal failure of a call.
#[derive(Debug)]
pub struct FailureResult {
    retries: usize,
    attempts: Vec<AttemptRecord>,
    last_error: Option<AttemptFailure>,
    last_response: Option<Response<Bytes>>,
}

impl FailureResult {
    pub fn new(
        retries: usize,
        attempts: Vec<AttemptRecord>,
        last_error: Option<AttemptFailure>,
        last_response: Option<Response<Bytes>>,
    ) -> Self {
        Self { retries, attempts, last_error, last_response }
    }

    /// Number of attempts actually performed.
    pub fn retries(&self) -> usize {
        self.retries
    }

    /// Recorded attempts, oldest first. Empty unless `keep_log` was enabled.
    pub fn attempts(&self) -> &[AttemptRecord] {
        &self.attempts
    }

    pub fn last_error(&self) -> Option<&AttemptFailure> {
        self.last_error.as_ref()
    }

    /// Response of the final attempt, when it produced one.
    pub fn last_response(&self) -> Option<&Response<Bytes>> {
        self.last_response.as_ref()
    }

    pub fn take_last_response(&mut self) -> Option<Response<Bytes>> {
        self.last_response.take()
    }
}

impl fmt::Display for FailureResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gave up after {} attempts", self.retries)?;
        match &self.last_error {
            Some(err) => write!(f, "; last error: {}", err)?,
            None => write!(f, "; no attempt completed")?,
        }
        if !self.attempts.is_empty() {
            write!(f, "; attempts: [")?;
            for (idx, record) in self.attempts.iter().enumerate() {
                if idx > 0 {
                    write!(f, "; ")?;
                }
                write!(f, "{}", record)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

/// Collects attempt records during a call and builds the final [`FailureResult`].
#[derive(Debug)]
pub struct FailureAggregator {
    keep_log: bool,
    attempts: Vec<AttemptRecord>,
    last_error: Option<AttemptFailure>,
}

impl FailureAggregator {
    pub fn new(keep_log: bool) -> Self {
        Self { keep_log, attempts: Vec::new(), last_error: None }
    }

    /// Note a finished attempt. The record is only retained when `keep_log` is set.
    pub fn record(&mut self, record: AttemptRecord) {
        if let Some(err) = &record.error {
            self.last_error = Some(err.clone());
        }
        if self.keep_log {
            self.attempts.push(record);
        }
    }

    pub fn attempts(&self) -> &[AttemptRecord] {
        &self.attempts
    }

    pub fn finish(self, retries: usize, last_response: Option<Response<Bytes>>) -> FailureResult {
        FailureResult::new(retries, self.attempts, self.last_error, last_response)
    }
}
