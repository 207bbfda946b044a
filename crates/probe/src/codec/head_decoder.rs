//! Incremental decoder for the response status line and header block.
//!
//! Runs `httparse` over the running buffer on every feed: a partial head
//! just waits for more bytes (bounded, so a peer cannot grow the buffer
//! forever), a complete head is materialized into a [`ResponseHead`] and
//! the body framing mode is derived from its headers.
//!
//! # Limits
//!
//! - Maximum number of headers: 64
//! - Maximum header block size: 8KB
//! - HTTP/1.0 and HTTP/1.1 only

use bytes::{Buf, BytesMut};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use httparse::Status;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;

use crate::protocol::{ParseError, PayloadKind, ResponseHead};

/// Maximum number of headers accepted in a response
const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the entire head section
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Shortest head that can possibly be complete: `HTTP/1.1 200\r\n\r\n`
const MIN_HEAD_BYTES: usize = 16;

/// Decoder for the response head, yielding the parsed head together with
/// the [`PayloadKind`] that governs the rest of the message.
pub struct HeadDecoder;

impl Decoder for HeadDecoder {
    type Item = (ResponseHead, PayloadKind);
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < MIN_HEAD_BYTES {
            return Ok(None);
        }

        let (head, head_size) = {
            let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
            let mut response = httparse::Response::new(&mut headers);

            let parsed = response.parse(src).map_err(|e| match e {
                httparse::Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
                e => ParseError::invalid_head(e.to_string()),
            })?;

            match parsed {
                Status::Complete(head_size) => {
                    trace!(head_size, "parsed response head");
                    ensure!(head_size <= MAX_HEADER_BYTES, ParseError::too_large_header(head_size, MAX_HEADER_BYTES));

                    (materialize(&response)?, head_size)
                }
                Status::Partial => {
                    ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
                    return Ok(None);
                }
            }
        };

        src.advance(head_size);

        let payload_kind = parse_payload(&head)?;
        Ok(Some((head, payload_kind)))
    }
}

/// Copies a completed `httparse` response into an owned [`ResponseHead`].
fn materialize(response: &httparse::Response<'_, '_>) -> Result<ResponseHead, ParseError> {
    // only 1.0 and 1.1 speak this framing
    match response.version {
        Some(0) | Some(1) => {}
        version => return Err(ParseError::InvalidVersion(version)),
    }

    let code = response.code.ok_or(ParseError::InvalidStatus(None))?;
    let status = StatusCode::from_u16(code).map_err(|_| ParseError::InvalidStatus(Some(code)))?;
    let reason = response.reason.unwrap_or_default().to_string();

    let mut headers = HeaderMap::with_capacity(response.headers.len());
    for header in response.headers.iter() {
        let name = HeaderName::from_bytes(header.name.as_bytes()).map_err(|e| ParseError::invalid_head(e.to_string()))?;
        let value = HeaderValue::from_bytes(header.value).map_err(|e| ParseError::invalid_head(e.to_string()))?;
        headers.append(name, value);
    }

    Ok(ResponseHead::new(status, reason, headers))
}

/// Derives the body framing mode from a completed head.
///
/// `Content-Length` wins when present; otherwise `Transfer-Encoding` with
/// `chunked` as the final encoding selects chunked framing; otherwise the
/// body runs until the peer closes the connection.
fn parse_payload(head: &ResponseHead) -> Result<PayloadKind, ParseError> {
    if let Some(value) = head.headers().get(http::header::CONTENT_LENGTH) {
        let text = value.to_str().map_err(|_| ParseError::invalid_content_length("value is not visible ascii"))?;
        let length =
            text.trim().parse::<u64>().map_err(|_| ParseError::invalid_content_length(format!("value {text} is not u64")))?;
        return Ok(PayloadKind::Length(length));
    }

    if is_chunked(head.headers().get(http::header::TRANSFER_ENCODING)) {
        return Ok(PayloadKind::Chunked);
    }

    Ok(PayloadKind::UntilClose)
}

/// Checks whether `chunked` is the final transfer encoding, the only
/// position where it governs message framing.
fn is_chunked(header_value: Option<&HeaderValue>) -> bool {
    const CHUNKED: &[u8] = b"chunked";
    if let Some(value) = header_value {
        if let Some(bytes) = value.as_bytes().rsplit(|b| *b == b',').next() {
            return bytes.trim_ascii() == CHUNKED;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn complete_head() {
        let mut buf = BytesMut::from(&b"HTTP/1.1 404 NOT FOUND\r\nContent-Length: 5\r\nX-Probe: a\r\n\r\nhello"[..]);

        let (head, payload_kind) = HeadDecoder.decode(&mut buf).unwrap().unwrap();

        assert_eq!(head.status(), StatusCode::NOT_FOUND);
        // the wire reason survives, canonical or not
        assert_eq!(head.reason(), "NOT FOUND");
        assert_eq!(payload_kind, PayloadKind::Length(5));
        assert_eq!(head.headers().get("x-probe").unwrap(), "a");

        // body bytes stay in the buffer
        assert_eq!(&buf[..], b"hello");
    }

    #[test]
    fn partial_head_waits_for_more() {
        let partial = b"HTTP/1.1 200 OK\r\nContent-Le";
        let mut buf = BytesMut::from(&partial[..]);

        assert!(HeadDecoder.decode(&mut buf).unwrap().is_none());
        // nothing consumed while the head is incomplete
        assert_eq!(buf.len(), partial.len());

        buf.extend_from_slice(b"ngth: 0\r\n\r\n");
        let (head, payload_kind) = HeadDecoder.decode(&mut buf).unwrap().unwrap();

        assert_eq!(head.status(), StatusCode::OK);
        assert_eq!(payload_kind, PayloadKind::Length(0));
    }

    #[test]
    fn malformed_status_line_is_an_error() {
        let mut buf = BytesMut::from(&b"NOT HTTP\r\n\r\n    pad to minimum length"[..]);

        assert!(HeadDecoder.decode(&mut buf).is_err());
    }

    #[test]
    fn oversized_partial_head_is_an_error() {
        // a single never-ending header value, so the size bound trips
        // before the header-count bound can
        let mut buf = BytesMut::from(&b"HTTP/1.1 200 OK\r\nX-Pad: "[..]);
        while buf.len() <= MAX_HEADER_BYTES {
            buf.extend_from_slice(&[b'y'; 64]);
        }

        let result = HeadDecoder.decode(&mut buf);
        assert!(matches!(result, Err(ParseError::TooLargeHeader { .. })));
    }

    #[test]
    fn chunked_when_final_encoding() {
        let mut buf = BytesMut::from(&b"HTTP/1.1 200 OK\r\nTransfer-Encoding: gzip, chunked\r\n\r\n"[..]);
        let (_, payload_kind) = HeadDecoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(payload_kind, PayloadKind::Chunked);

        let mut buf = BytesMut::from(&b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked, gzip\r\n\r\n"[..]);
        let (_, payload_kind) = HeadDecoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(payload_kind, PayloadKind::UntilClose);
    }

    #[test]
    fn no_framing_headers_means_until_close() {
        let mut buf = BytesMut::from(&b"HTTP/1.0 200 OK\r\nServer: old\r\n\r\n"[..]);
        let (_, payload_kind) = HeadDecoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(payload_kind, PayloadKind::UntilClose);
    }

    #[test]
    fn content_length_wins_over_transfer_encoding() {
        let mut buf = BytesMut::from(&b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\nTransfer-Encoding: chunked\r\n\r\n"[..]);
        let (_, payload_kind) = HeadDecoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(payload_kind, PayloadKind::Length(3));
    }

    #[test]
    fn invalid_content_length_is_an_error() {
        let mut buf = BytesMut::from(&b"HTTP/1.1 200 OK\r\nContent-Length: many\r\n\r\n"[..]);
        let result = HeadDecoder.decode(&mut buf);
        assert!(matches!(result, Err(ParseError::InvalidContentLength { .. })));
    }

    #[test]
    fn header_names_are_lower_cased() {
        let str = indoc! {r#"
        HTTP/1.1 200 OK
        Server: tester
        Content-Type: application/json
        Content-Length: 0

        "#};
        let mut buf = BytesMut::from(str);

        let (head, _) = HeadDecoder.decode(&mut buf).unwrap().unwrap();

        let names: Vec<_> = head.headers().keys().map(http::HeaderName::as_str).collect();
        assert_eq!(names, vec!["server", "content-type", "content-length"]);
        assert_eq!(head.headers().get("content-type").unwrap(), "application/json");
    }
}
