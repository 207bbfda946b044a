//! Serializer for the outbound request head.
//!
//! Produces the request line plus header lines, CRLF-separated but
//! *without* the final blank-line CRLF: the terminator is a separate wire
//! unit because releasing it is what makes a body-less request decodable as
//! complete, and the transmitter may hold it back until the target time.
//!
//! Header merging rules:
//!
//! - defaults `Host`, `Connection: keep-alive`, `Accept: application/json`
//!   are written first, each skipped when the caller supplied the same name
//!   (case-insensitively)
//! - caller headers follow in insertion order with their spelling intact
//! - any caller-supplied `Content-Length` is discarded; the exact value is
//!   computed and appended iff body bytes will actually be transmitted

use bytes::{BufMut, Bytes, BytesMut};

use crate::protocol::Request;

/// Initial buffer size for head serialization
const INIT_HEAD_SIZE: usize = 1024;

const CONTENT_LENGTH: &str = "Content-Length";

/// Encoder for the outbound request head.
pub struct RequestEncoder;

impl RequestEncoder {
    /// Serializes the head block of `request`, terminator excluded.
    pub fn encode(&self, request: &Request) -> Bytes {
        let mut dst = BytesMut::with_capacity(INIT_HEAD_SIZE);

        dst.put_slice(request.method_ref().as_str().as_bytes());
        dst.put_slice(b" ");
        dst.put_slice(request.path_ref().as_bytes());
        dst.put_slice(b" HTTP/1.1");

        let defaults =
            [("Host", request.host_header()), ("Connection", "keep-alive".to_string()), ("Accept", "application/json".to_string())];
        for (name, value) in &defaults {
            if request.header_value(name).is_none() {
                put_header_line(&mut dst, name, value);
            }
        }

        for (name, value) in request.headers() {
            if name.eq_ignore_ascii_case(CONTENT_LENGTH) {
                continue;
            }
            put_header_line(&mut dst, name, value);
        }

        if request.is_bodied() {
            put_header_line(&mut dst, CONTENT_LENGTH, &request.body_ref().len().to_string());
        }

        dst.freeze()
    }
}

/// Every line is preceded by its CRLF, so the block never ends with one.
fn put_header_line(dst: &mut BytesMut, name: &str, value: &str) {
    dst.put_slice(b"\r\n");
    dst.put_slice(name.as_bytes());
    dst.put_slice(b": ");
    dst.put_slice(value.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn encode_to_string(request: &Request) -> String {
        String::from_utf8(RequestEncoder.encode(request).to_vec()).unwrap()
    }

    #[test]
    fn defaults_are_merged_in() {
        let head = encode_to_string(&Request::new("example.com", 8080).path("/status"));

        assert_eq!(
            head,
            "GET /status HTTP/1.1\r\nHost: example.com:8080\r\nConnection: keep-alive\r\nAccept: application/json"
        );
    }

    #[test]
    fn head_never_ends_with_crlf() {
        let head = RequestEncoder.encode(&Request::new("example.com", 80));
        assert!(!head.ends_with(b"\r\n"));

        // appending the terminator yields exactly one blank line
        let mut wire = head.to_vec();
        wire.extend_from_slice(crate::protocol::TERMINATOR);
        assert!(wire.ends_with(b"\r\n\r\n"));
        assert!(!wire.ends_with(b"\r\n\r\n\r\n"));
    }

    #[test]
    fn caller_headers_override_defaults_and_keep_case() {
        let request = Request::new("example.com", 80).header("accept", "text/html").header("X-Probe", "1");
        let head = encode_to_string(&request);

        assert_eq!(
            head,
            "GET / HTTP/1.1\r\nHost: example.com\r\nConnection: keep-alive\r\naccept: text/html\r\nX-Probe: 1"
        );
    }

    #[test]
    fn bodied_request_gets_exact_content_length() {
        let request = Request::new("example.com", 80).method(Method::POST).path("/submit").body("hello world");
        let head = encode_to_string(&request);

        assert!(head.contains("Content-Length: 11"));
    }

    #[test]
    fn caller_content_length_is_discarded() {
        let request =
            Request::new("example.com", 80).method(Method::POST).header("content-length", "999").body("four");
        let head = encode_to_string(&request);

        assert!(head.contains("Content-Length: 4"));
        assert!(!head.contains("999"));
    }

    #[test]
    fn get_with_body_transmits_no_content_length() {
        let request = Request::new("example.com", 80).body("ignored");
        let head = encode_to_string(&request);

        assert!(!head.to_ascii_lowercase().contains("content-length"));
    }

    #[test]
    fn head_with_body_transmits_no_content_length() {
        let request = Request::new("example.com", 80).method(Method::HEAD).body("ignored");
        let head = encode_to_string(&request);

        assert!(!head.to_ascii_lowercase().contains("content-length"));
    }
}
