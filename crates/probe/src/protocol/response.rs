//! Parsed response types.
//!
//! [`ResponseHead`] is produced by the head decoder once the status line and
//! header block are complete; [`Response`] is the frozen final value handed
//! to the caller after the body framing rule has been satisfied.
//!
//! The reason phrase is kept verbatim from the wire (an `http::Response`
//! would drop it), which is why these are concrete structs rather than
//! aliases over the `http` crate's types.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};

/// Status line and header block of a response.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    status: StatusCode,
    reason: String,
    headers: HeaderMap,
}

impl ResponseHead {
    pub(crate) fn new(status: StatusCode, reason: String, headers: HeaderMap) -> Self {
        Self { status, reason, headers }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The reason phrase exactly as the server sent it.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Header names are lower-cased by construction; values are stored with
    /// surrounding whitespace trimmed.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// A complete HTTP response: head plus the accumulated body.
///
/// Immutable once constructed. The body is the concatenation of every
/// decoded chunk, interpreted as (lossy) UTF-8 text.
#[derive(Debug, Clone)]
pub struct Response {
    head: ResponseHead,
    body: String,
}

impl Response {
    pub(crate) fn assemble(head: ResponseHead, chunks: &[Bytes]) -> Self {
        let mut bytes = Vec::with_capacity(chunks.iter().map(Bytes::len).sum());
        for chunk in chunks {
            bytes.extend_from_slice(chunk);
        }
        let body = String::from_utf8_lossy(&bytes).into_owned();
        Self { head, body }
    }

    pub fn status(&self) -> StatusCode {
        self.head.status()
    }

    pub fn reason(&self) -> &str {
        self.head.reason()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.head.headers()
    }

    /// Convenience lookup; names are matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers().get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_concatenates_chunks() {
        let head = ResponseHead::new(StatusCode::OK, "OK".to_string(), HeaderMap::new());
        let response = Response::assemble(head, &[Bytes::from_static(b"he"), Bytes::from_static(b"llo")]);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.reason(), "OK");
        assert_eq!(response.body(), "hello");
    }
}
