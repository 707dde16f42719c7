//! The fail-aware client facade.
//!
//! `execute` is the core operation; `post` and `get` only build a request and delegate
//! to it.
//!
//! Example
//! ```rust,no_run
//! use failaware::{Client, Options};
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), failaware::FailAwareError> {
//! let client = Client::from_options(
//!     Options::default()
//!         .max_retries(5)
//!         .back_off_delay_factor(Duration::from_millis(100))
//!         .keep_log(true),
//! );
//! let rsp = client.post("http://localhost:8080/items", "application/json", "{}").await?;
//! println!("status {}", rsp.status());
//! # Ok(())
//! # }
//! ```

use crate::backoff::BackoffCalculator;
use crate::body::Body;
use crate::error::{BuildError, FailAwareError};
use crate::executor::{RequestSnapshot, RetryExecutor};
use crate::jitter::{RandomSource, ThreadRandom};
use crate::logging::Logger;
use crate::options::Options;
use crate::sleeper::{Sleeper, TokioSleeper};
use crate::transport::Transport;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, Request, Response, Uri};
use std::sync::Arc;

/// HTTP client that retries retryable outcomes and reports structured failures.
///
/// Cloning is cheap; clones share options, transport, logger and random source.
#[derive(Debug, Clone)]
pub struct Client {
    options: Arc<Options>,
    executor: Arc<RetryExecutor>,
}

impl Client {
    /// Construct a new builder with defaults.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Client with `options` (resolved against the defaults) over `transport`.
    pub fn new<T>(options: Options, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        Self::assemble(options, Arc::new(transport), Arc::new(ThreadRandom), Arc::new(TokioSleeper))
    }

    /// Client with the default options over `transport`.
    pub fn with_defaults<T>(transport: T) -> Self
    where
        T: Transport + 'static,
    {
        Self::new(Options::defaults(), transport)
    }

    fn assemble(
        options: Options,
        transport: Arc<dyn Transport>,
        random: Arc<dyn RandomSource>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let options = options.resolve();
        let executor = RetryExecutor::new(
            options.max_retries,
            options.timeout,
            options.keep_log,
            BackoffCalculator::new(options.back_off_delay_factor),
            transport,
            options.effective_logger(),
            random,
            sleeper,
        );
        Self { options: Arc::new(options), executor: Arc::new(executor) }
    }

    /// The resolved options in effect.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Send `request`, retrying retryable outcomes.
    ///
    /// A `tokio_util::sync::CancellationToken` in the request extensions aborts the call
    /// before the next attempt, during an attempt, or during a backoff wait. The request
    /// body is read once and dropped before this returns, whatever the outcome.
    pub async fn execute(&self, request: Request<Body>) -> Result<Response<Bytes>, FailAwareError> {
        let (snapshot, cancel) = RequestSnapshot::capture(request).await?;
        self.executor.run(&snapshot, cancel.as_ref()).await
    }

    /// POST `body` to `url` with the given `Content-Type`.
    pub async fn post<U, B>(
        &self,
        url: U,
        content_type: &str,
        body: B,
    ) -> Result<Response<Bytes>, FailAwareError>
    where
        U: TryInto<Uri>,
        <U as TryInto<Uri>>::Error: Into<http::Error>,
        B: Into<Body>,
    {
        let request = Request::builder()
            .method(Method::POST)
            .uri(url)
            .header(CONTENT_TYPE, content_type)
            .body(body.into())?;
        self.execute(request).await
    }

    /// GET `url` without a body.
    pub async fn get<U>(&self, url: U) -> Result<Response<Bytes>, FailAwareError>
    where
        U: TryInto<Uri>,
        <U as TryInto<Uri>>::Error: Into<http::Error>,
    {
        let request = Request::builder().method(Method::GET).uri(url).body(Body::empty())?;
        self.execute(request).await
    }
}

#[cfg(feature = "reqwest")]
impl Client {
    /// Client with `options` over a default `reqwest` transport.
    pub fn from_options(options: Options) -> Self {
        Self::new(options, crate::transport::ReqwestTransport::default())
    }

    /// Client with the default options over a default `reqwest` transport.
    pub fn default_client() -> Self {
        Self::from_options(Options::defaults())
    }
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    options: Options,
    transport: Option<Arc<dyn Transport>>,
    random: Arc<dyn RandomSource>,
    sleeper: Arc<dyn Sleeper>,
}

impl ClientBuilder {
    /// Create a builder with default options, thread-local randomness and the tokio timer.
    pub fn new() -> Self {
        Self {
            options: Options::defaults(),
            transport: None,
            random: Arc::new(ThreadRandom),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the options. Zero fields are resolved against the defaults at build time.
    pub fn options(mut self, options: Options) -> Self {
        let logger = self.options.logger.take();
        self.options = options;
        if self.options.logger.is_none() {
            self.options.logger = logger;
        }
        self
    }

    pub fn transport<T>(mut self, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Share an existing transport between clients.
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn logger<L>(mut self, logger: L) -> Self
    where
        L: Logger + 'static,
    {
        self.options.logger = Some(Arc::new(logger));
        self
    }

    /// Provide the random source for jitter, e.g. a seeded one for reproducible waits.
    pub fn random<R>(mut self, random: R) -> Self
    where
        R: RandomSource + 'static,
    {
        self.random = Arc::new(random);
        self
    }

    /// Provide a custom sleeper implementation.
    pub fn sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Build the client, validating inputs.
    pub fn build(self) -> Result<Client, BuildError> {
        let transport = self.transport.ok_or(BuildError::MissingTransport)?;
        Ok(Client::assemble(self.options, transport, self.random, self.sleeper))
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::logging::RecordingLogger;
    use crate::sleeper::InstantSleeper;
    use async_trait::async_trait;
    use http::StatusCode;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct EchoTransport {
        seen: Mutex<Vec<Request<Bytes>>>,
    }

    #[async_trait]
    impl Transport for EchoTransport {
        async fn send(
            &self,
            request: Request<Bytes>,
            _timeout: Duration,
        ) -> Result<Response<Bytes>, TransportError> {
            let body = request.body().clone();
            self.seen.lock().unwrap().push(request);
            Ok(Response::new(body))
        }
    }

    #[test]
    fn builder_requires_transport() {
        let err = Client::builder().build().unwrap_err();
        assert_eq!(err, BuildError::MissingTransport);
    }

    #[test]
    fn options_are_resolved() {
        let client = Client::new(Options::default().keep_log(true), EchoTransport::default());
        assert_eq!(client.options().max_retries, 3);
        assert_eq!(client.options().timeout, Duration::from_secs(1));
        assert!(client.options().keep_log);
    }

    #[test]
    fn builder_keeps_logger_across_options() {
        let logger = RecordingLogger::new();
        let client = Client::builder()
            .logger(logger)
            .options(Options::default().max_retries(2))
            .transport(EchoTransport::default())
            .sleeper(InstantSleeper)
            .build()
            .unwrap();
        assert!(client.options().logger.is_some());
        assert_eq!(client.options().max_retries, 2);
    }

    #[tokio::test]
    async fn post_sets_content_type_and_body() {
        let transport = Arc::new(EchoTransport::default());
        let client = Client::builder().shared_transport(transport.clone()).build().unwrap();

        let rsp =
            client.post("http://localhost/items", "application/json", "{\"a\":1}").await.unwrap();
        assert_eq!(rsp.status(), StatusCode::OK);
        assert_eq!(&rsp.body()[..], b"{\"a\":1}");

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method(), Method::POST);
        assert_eq!(seen[0].headers()[CONTENT_TYPE], "application/json");
    }

    #[tokio::test]
    async fn get_sends_no_body() {
        let transport = Arc::new(EchoTransport::default());
        let client = Client::builder().shared_transport(transport.clone()).build().unwrap();

        client.get("http://localhost/items").await.unwrap();
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].method(), Method::GET);
        assert!(seen[0].body().is_empty());
    }

    #[tokio::test]
    async fn malformed_url_is_rejected_before_any_attempt() {
        let transport = Arc::new(EchoTransport::default());
        let client = Client::builder().shared_transport(transport.clone()).build().unwrap();

        let err = client.get("http://bad host/").await.unwrap_err();
        assert!(matches!(err, FailAwareError::InvalidRequest(_)));
        assert!(transport.seen.lock().unwrap().is_empty());
    }
}
