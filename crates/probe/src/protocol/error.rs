use std::io;
use std::time::Duration;

use thiserror::Error;

/// Top-level failure of a [`send`](crate::connection::Transmitter::send) call.
///
/// Exactly one of these reaches the caller; there is no partial-response
/// outcome and nothing is retried internally.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The transport could not be established: unreachable host, refused
    /// connection, TLS handshake failure, or connect timeout.
    #[error("connection error: {source}")]
    Connection {
        #[source]
        source: io::Error,
    },

    /// An established connection reported an error mid-transfer.
    #[error("transport error: {source}")]
    Transport {
        #[source]
        source: io::Error,
    },

    /// The received bytes could not be interpreted as a well-formed
    /// HTTP response.
    #[error("parse error: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },
}

impl HttpError {
    pub fn connection<E: Into<io::Error>>(e: E) -> Self {
        Self::Connection { source: e.into() }
    }

    pub fn connect_timeout(limit: Duration) -> Self {
        Self::Connection { source: io::Error::new(io::ErrorKind::TimedOut, format!("connect timed out after {limit:?}")) }
    }

    pub fn transport<E: Into<io::Error>>(e: E) -> Self {
        Self::Transport { source: e.into() }
    }
}

/// A failure while assembling the inbound bytes into a response.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("invalid response head: {reason}")]
    InvalidHead { reason: String },

    #[error("invalid http version: {0:?}")]
    InvalidVersion(Option<u8>),

    #[error("invalid status code: {0:?}")]
    InvalidStatus(Option<u16>),

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("connection closed before the response was complete: {reason}")]
    UnexpectedEof { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_head<S: ToString>(str: S) -> Self {
        Self::InvalidHead { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn unexpected_eof<S: ToString>(str: S) -> Self {
        Self::UnexpectedEof { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
