//! The injected capability that performs one HTTP round-trip.
//!
//! The client treats the transport as opaque: connection pooling, TLS, redirects and
//! protocol negotiation all belong to the implementation. Every attempt hands the
//! transport a freshly built request together with the per-attempt deadline.

use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use std::fmt;
use std::time::Duration;

/// One request/response exchange.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Send `request`, giving up after `timeout`.
    async fn send(
        &self,
        request: Request<Bytes>,
        timeout: Duration,
    ) -> Result<Response<Bytes>, TransportError>;
}

#[cfg(feature = "reqwest")]
pub use self::reqwest_transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use super::*;

    /// Transport backed by a `reqwest::Client`.
    #[derive(Debug, Clone, Default)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    fn map_error(err: reqwest::Error, timeout: Duration) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(timeout)
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::other(err)
        }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn send(
            &self,
            request: Request<Bytes>,
            timeout: Duration,
        ) -> Result<Response<Bytes>, TransportError> {
            let mut request = reqwest::Request::try_from(request).map_err(TransportError::other)?;
            *request.timeout_mut() = Some(timeout);

            let response = self.client.execute(request).await.map_err(|e| map_error(e, timeout))?;

            let status = response.status();
            let version = response.version();
            let headers = response.headers().clone();
            let body = response.bytes().await.map_err(|e| map_error(e, timeout))?;

            let mut out = Response::new(body);
            *out.status_mut() = status;
            *out.version_mut() = version;
            *out.headers_mut() = headers;
            Ok(out)
        }
    }
}
