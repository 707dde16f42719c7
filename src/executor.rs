//! The attempt loop.
//!
//! Semantics:
//! - `max_retries` counts total attempts, the first one included; at least one attempt is
//!   always made.
//! - Each attempt sends a request rebuilt from the captured snapshot with a fresh copy of
//!   the body, bounded by the per-attempt timeout.
//! - A terminal classification returns the response as-is. A retryable one is recorded,
//!   followed by a jittered backoff wait unless it was the final attempt.
//! - The request's cancellation token is observed before each attempt, during the
//!   transport call and during the wait. Cancellation reports the attempts completed so
//!   far; an interrupted attempt is not counted.
//!
//! Invariants:
//! - Attempts never exceed `max_retries`.
//! - Backoff is computed exactly `attempts - 1` times on exhaustion.
//! - `started_at` of attempt `n + 1` is at least `finished_at` of attempt `n` plus its wait.

use crate::backoff::BackoffCalculator;
use crate::body::{Body, ReplayBody};
use crate::classify::{classify, Classification};
use crate::error::{FailAwareError, TransportError};
use crate::failure::{AttemptRecord, FailureAggregator, ResponseSnapshot};
use crate::jitter::RandomSource;
use crate::logging::Logger;
use crate::sleeper::Sleeper;
use crate::transport::Transport;
use bytes::Bytes;
use http::{HeaderMap, Method, Request, Response, Uri, Version};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Method, target, headers and body of a request, captured once per call.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    body: ReplayBody,
}

impl RequestSnapshot {
    /// Capture `request`, reading its body to the end.
    ///
    /// Returns the cancellation token found in the request extensions, if any.
    pub async fn capture(
        request: Request<Body>,
    ) -> Result<(Self, Option<CancellationToken>), FailAwareError> {
        let (parts, body) = request.into_parts();
        let cancel = parts.extensions.get::<CancellationToken>().cloned();
        let body = ReplayBody::capture(body).await.map_err(FailAwareError::Body)?;
        let snapshot = Self {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            body,
        };
        Ok((snapshot, cancel))
    }

    /// A new request for one attempt.
    pub fn attempt_request(&self) -> Request<Bytes> {
        let mut request = Request::new(self.body.replay());
        *request.method_mut() = self.method.clone();
        *request.uri_mut() = self.uri.clone();
        *request.version_mut() = self.version;
        *request.headers_mut() = self.headers.clone();
        request
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn body(&self) -> &ReplayBody {
        &self.body
    }
}

/// Runs the retry loop for a client.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    max_retries: usize,
    timeout: Duration,
    keep_log: bool,
    backoff: BackoffCalculator,
    transport: Arc<dyn Transport>,
    logger: Arc<dyn Logger>,
    random: Arc<dyn RandomSource>,
    sleeper: Arc<dyn Sleeper>,
}

impl RetryExecutor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        max_retries: usize,
        timeout: Duration,
        keep_log: bool,
        backoff: BackoffCalculator,
        transport: Arc<dyn Transport>,
        logger: Arc<dyn Logger>,
        random: Arc<dyn RandomSource>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self { max_retries, timeout, keep_log, backoff, transport, logger, random, sleeper }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_retries.max(1)
    }

    /// Run every attempt for `snapshot` until a terminal outcome, exhaustion, or cancellation.
    pub async fn run(
        &self,
        snapshot: &RequestSnapshot,
        cancel: Option<&CancellationToken>,
    ) -> Result<Response<Bytes>, FailAwareError> {
        let max_attempts = self.max_attempts();
        let mut log = FailureAggregator::new(self.keep_log);
        let mut last_response: Option<Response<Bytes>> = None;

        for attempt in 0..max_attempts {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(cancelled(log, attempt, last_response));
            }

            let started_at = Instant::now();
            let outcome = match self.send(snapshot.attempt_request(), cancel).await {
                Some(outcome) => outcome,
                None => return Err(cancelled(log, attempt, last_response)),
            };
            let finished_at = Instant::now();

            match &outcome {
                Ok(rsp) => self.logger.debug(format_args!(
                    "attempt #{}: HTTP response status {}",
                    attempt + 1,
                    rsp.status()
                )),
                Err(err) => {
                    self.logger.debug(format_args!("attempt #{}: error {}", attempt + 1, err))
                }
            }

            let (failure, response) = match classify(outcome) {
                Classification::Success(response) => return Ok(response),
                Classification::Retry { failure, response } => (failure, response),
            };

            let is_last = attempt + 1 >= max_attempts;
            let wait = (!is_last).then(|| self.backoff.delay(attempt, self.random.as_ref()));

            log.record(AttemptRecord {
                number: attempt + 1,
                error: Some(failure),
                response: response.as_ref().map(ResponseSnapshot::of),
                started_at,
                finished_at,
                backoff: wait,
            });
            last_response = response;

            let Some(wait) = wait else { break };
            if !self.wait(wait, cancel).await {
                return Err(cancelled(log, attempt + 1, last_response));
            }
            self.logger.debug(format_args!(
                "Retry #{} of request, waited {}ms before retry",
                attempt + 1,
                wait.as_millis()
            ));
        }

        let failure = log.finish(max_attempts, last_response);
        Err(FailAwareError::RetriesExhausted(Box::new(failure)))
    }

    /// One transport call bounded by the timeout. `None` when cancelled first.
    async fn send(
        &self,
        request: Request<Bytes>,
        cancel: Option<&CancellationToken>,
    ) -> Option<Result<Response<Bytes>, TransportError>> {
        let call = async {
            let send = self.transport.send(request, self.timeout);
            match tokio::time::timeout(self.timeout, send).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout(self.timeout)),
            }
        };
        match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => None,
                result = call => Some(result),
            },
            None => Some(call.await),
        }
    }

    /// Sleep for `wait`. `false` when cancelled first.
    async fn wait(&self, wait: Duration, cancel: Option<&CancellationToken>) -> bool {
        let sleep = self.sleeper.sleep(wait);
        match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => false,
                _ = sleep => true,
            },
            None => {
                sleep.await;
                true
            }
        }
    }
}

fn cancelled(
    log: FailureAggregator,
    completed: usize,
    last_response: Option<Response<Bytes>>,
) -> FailAwareError {
    FailAwareError::Cancelled(Box::new(log.finish(completed, last_response)))
}
