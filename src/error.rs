//! Error types surfaced by the fail-aware client.
//!
//! Only final states reach the caller: a response (any status below 500 other than 429),
//! [`FailAwareError::RetriesExhausted`], or [`FailAwareError::Cancelled`]. Intermediate
//! retryable failures are kept inside the [`FailureResult`] attempt log.

use crate::failure::FailureResult;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failure of the underlying transport to produce a response. Always retryable.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The attempt did not finish within the per-attempt deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// Connection could not be established (refused, DNS, TLS handshake).
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("transport error: {0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    pub fn other<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        TransportError::Other(err.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout(_))
    }
}

/// Error returned by [`Client`](crate::Client) calls.
#[derive(Debug, Error)]
pub enum FailAwareError {
    /// The request body could not be read; no attempt was made.
    #[error("failed to read request body: {0}")]
    Body(#[source] io::Error),
    /// The request could not be built (for example a malformed URL).
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] http::Error),
    /// Every attempt ended in a retryable outcome.
    #[error("{0}")]
    RetriesExhausted(Box<FailureResult>),
    /// The request's cancellation token fired before a terminal outcome.
    #[error("request cancelled: {0}")]
    Cancelled(Box<FailureResult>),
}

impl FailAwareError {
    /// The structured failure record, for exhausted or cancelled calls.
    pub fn failure(&self) -> Option<&FailureResult> {
        match self {
            Self::RetriesExhausted(f) | Self::Cancelled(f) => Some(&**f),
            _ => None,
        }
    }

    /// Take ownership of the failure record.
    pub fn into_failure(self) -> Option<FailureResult> {
        match self {
            Self::RetriesExhausted(f) | Self::Cancelled(f) => Some(*f),
            _ => None,
        }
    }

    /// Attempts performed before the call gave up, if it got that far.
    pub fn retries(&self) -> Option<usize> {
        self.failure().map(FailureResult::retries)
    }

    pub fn is_retries_exhausted(&self) -> bool {
        matches!(self, Self::RetriesExhausted(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Errors produced while resolving configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("log level {0:?} is not known")]
    UnknownLogLevel(String),
}

/// Errors produced while building a client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// No transport was supplied.
    #[error("a transport is required to build a client")]
    MissingTransport,
}
