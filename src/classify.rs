//! Retry/terminal classification of a single attempt's outcome.
//!
//! Rule:
//! - no transport error and status < 500 and status != 429: terminal success, returned
//!   as-is (4xx included; callers inspect the status themselves)
//! - transport error, status >= 500, or status 429: retryable
//!
//! There is no third outcome.

use crate::error::TransportError;
use bytes::Bytes;
use http::{Response, StatusCode};
use std::fmt;
use std::sync::Arc;

/// Why an attempt was retryable.
#[derive(Debug, Clone)]
pub enum AttemptFailure {
    /// The transport failed to produce a response.
    Transport(Arc<TransportError>),
    /// The server answered with a 5xx status.
    ServerError(StatusCode),
    /// The server answered 429.
    RateLimited,
}

impl AttemptFailure {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AttemptFailure::Transport(_) => None,
            AttemptFailure::ServerError(status) => Some(*status),
            AttemptFailure::RateLimited => Some(StatusCode::TOO_MANY_REQUESTS),
        }
    }

    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            AttemptFailure::Transport(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Transport(err) => write!(f, "{}", err),
            AttemptFailure::ServerError(status) => write!(f, "server error {}", status),
            AttemptFailure::RateLimited => {
                write!(f, "rate limited ({})", StatusCode::TOO_MANY_REQUESTS)
            }
        }
    }
}

/// Decision for one attempt, carrying whatever the transport produced.
#[derive(Debug)]
pub enum Classification {
    /// Terminal: hand the response to the caller.
    Success(Response<Bytes>),
    /// Retryable: back off and try again, or give up if attempts are spent.
    Retry { failure: AttemptFailure, response: Option<Response<Bytes>> },
}

impl Classification {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Classification::Retry { .. })
    }
}

/// Classify a response status. `None` means terminal.
pub fn classify_status(status: StatusCode) -> Option<AttemptFailure> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        Some(AttemptFailure::RateLimited)
    } else if status.as_u16() >= 500 {
        Some(AttemptFailure::ServerError(status))
    } else {
        None
    }
}

/// Classify the transport outcome of one attempt.
pub fn classify(outcome: Result<Response<Bytes>, TransportError>) -> Classification {
    match outcome {
        Err(err) => Classification::Retry {
            failure: AttemptFailure::Transport(Arc::new(err)),
            response: None,
        },
        Ok(response) => match classify_status(response.status()) {
            Some(failure) => Classification::Retry { failure, response: Some(response) },
            None => Classification::Success(response),
        },
    }
}
