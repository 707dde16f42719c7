//! Convenient re-exports for common failaware types.
pub use crate::{
    body::Body,
    client::{Client, ClientBuilder},
    error::{FailAwareError, TransportError},
    failure::{AttemptRecord, FailureResult},
    logging::{LogLevel, Logger},
    options::Options,
    transport::Transport,
    CancellationToken,
};
