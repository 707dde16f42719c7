#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # failaware
//!
//! A resilience layer around a single HTTP request/response primitive: it decides
//! whether an outcome is terminal or retryable, replays the request body on every
//! attempt, paces retries with exponential backoff plus jitter, and on exhaustion
//! returns a structured, inspectable [`FailureResult`] instead of a bare error.
//!
//! ## Features
//!
//! - **Classification**: transport errors, 5xx and 429 are retried; everything else,
//!   4xx included, is returned as-is
//! - **Body replay**: the body is buffered once and every attempt sends the same bytes
//! - **Backoff**: `2^i * factor` with `±1/3` jitter from a swappable random source
//! - **Failure records**: per-attempt timestamps, outcomes and waits when `keep_log` is on
//! - **Cancellation** through a `CancellationToken` in the request extensions
//! - **Injected transport**: connection handling stays with the [`Transport`]
//!
//! ## Quick Start
//!
//! ```rust
//! use failaware::{Client, InstantSleeper, Options, Transport, TransportError};
//! use async_trait::async_trait;
//! use bytes::Bytes;
//! use http::{Request, Response};
//! use std::time::Duration;
//!
//! #[derive(Debug)]
//! struct Unreachable;
//!
//! #[async_trait]
//! impl Transport for Unreachable {
//!     async fn send(
//!         &self,
//!         _req: Request<Bytes>,
//!         _timeout: Duration,
//!     ) -> Result<Response<Bytes>, TransportError> {
//!         Err(TransportError::Connect("connection refused".into()))
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let client = Client::builder()
//!     .options(Options::default().max_retries(3).keep_log(true))
//!     .transport(Unreachable)
//!     .sleeper(InstantSleeper)
//!     .build()
//!     .unwrap();
//!
//! let err = client.get("http://localhost/doesNotExist").await.unwrap_err();
//! assert_eq!(err.retries(), Some(3));
//! assert_eq!(err.failure().unwrap().attempts().len(), 3);
//! # });
//! ```

pub mod backoff;
pub mod body;
pub mod classify;
pub mod client;
pub mod error;
pub mod executor;
pub mod failure;
pub mod jitter;
pub mod logging;
pub mod options;
pub mod prelude;
pub mod sleeper;
pub mod transport;

// Re-exports
pub use backoff::{BackoffCalculator, MAX_BACKOFF, MIN_BACKOFF};
pub use body::{Body, ReplayBody};
pub use classify::{classify, classify_status, AttemptFailure, Classification};
pub use client::{Client, ClientBuilder};
pub use error::{BuildError, ConfigError, FailAwareError, TransportError};
pub use executor::{RequestSnapshot, RetryExecutor};
pub use failure::{AttemptRecord, FailureAggregator, FailureResult, ResponseSnapshot};
pub use jitter::{RandomSource, SeededRandom, ThreadRandom};
pub use logging::{LogLevel, Logger, RecordingLogger, TracingLogger};
pub use options::Options;
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::Transport;
pub use tokio_util::sync::CancellationToken;
