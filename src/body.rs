//! Request bodies and their replay across attempts.
//!
//! A [`Body`] is read exactly once, before the first attempt, into a [`ReplayBody`].
//! Each attempt then receives its own `Bytes` handle starting at offset zero, so no
//! attempt can observe a body partially consumed by an earlier one. The whole body is
//! held in memory for the duration of the call.

use bytes::Bytes;
use std::fmt;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Caller-supplied request body.
#[derive(Default)]
pub enum Body {
    /// No body is sent.
    #[default]
    Empty,
    /// In-memory payload.
    Full(Bytes),
    /// Payload read from a stream when the call starts.
    Reader(Box<dyn AsyncRead + Send + Unpin>),
}

impl Body {
    pub fn empty() -> Self {
        Body::Empty
    }

    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Body::Reader(Box::new(reader))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => f.write_str("Body::Empty"),
            Body::Full(bytes) => f.debug_tuple("Body::Full").field(&bytes.len()).finish(),
            Body::Reader(_) => f.write_str("Body::Reader(<stream>)"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Full(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Full(Bytes::from(bytes))
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Full(Bytes::from(s))
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Body::Full(Bytes::from_static(s.as_bytes()))
    }
}

impl From<&'static [u8]> for Body {
    fn from(s: &'static [u8]) -> Self {
        Body::Full(Bytes::from_static(s))
    }
}

/// Body captured once and replayed for every attempt.
#[derive(Debug, Clone, Default)]
pub struct ReplayBody {
    buffer: Option<Bytes>,
}

impl ReplayBody {
    /// Read `body` to the end. The body, including any reader, is dropped on return.
    pub async fn capture(body: Body) -> io::Result<Self> {
        let buffer = match body {
            Body::Empty => None,
            Body::Full(bytes) => Some(bytes),
            Body::Reader(mut reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf).await?;
                Some(Bytes::from(buf))
            }
        };
        Ok(Self { buffer })
    }

    /// Fresh copy of the captured bytes for the next attempt; empty when there was no body.
    pub fn replay(&self) -> Bytes {
        self.buffer.clone().unwrap_or_default()
    }

    /// Whether the original request carried a body at all.
    pub fn is_present(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn len(&self) -> usize {
        self.buffer.as_ref().map_or(0, Bytes::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
