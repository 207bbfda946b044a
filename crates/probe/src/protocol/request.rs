//! Request description for one probe transmission.
//!
//! A [`Request`] is plain data: everything the transmitter needs to open a
//! connection, serialize the header block, and drive the timed delivery of
//! the final framing bytes. It carries no connection state and is consumed
//! by a single `send`.

use std::time::SystemTime;

use bytes::Bytes;
use http::Method;

/// A single raw HTTP request with an optional release instant.
///
/// Headers are kept as an ordered list of `(name, value)` pairs: names are
/// written to the wire exactly as the caller spelled them, while collision
/// and lookup are case-insensitive.
///
/// # Example
///
/// ```
/// use http::Method;
/// use micro_probe::protocol::Request;
///
/// let request = Request::new("localhost", 8080)
///     .method(Method::POST)
///     .path("/submit")
///     .header("X-Probe", "1")
///     .body("{}");
/// assert!(request.is_bodied());
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    host: String,
    port: u16,
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Bytes,
    target_time: Option<SystemTime>,
    use_tls: bool,
}

impl Request {
    /// Creates a plain `GET /` request for the given peer.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            method: Method::GET,
            path: "/".to_string(),
            headers: Vec::new(),
            body: Bytes::new(),
            target_time: None,
            use_tls: false,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets a header, replacing any existing value under a
    /// case-insensitively equal name. The spelling of `name` is preserved
    /// on the wire.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name, value)),
        }
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the absolute instant at which the final framing bytes are
    /// released: the blank-line terminator for body-less requests, the last
    /// body byte otherwise. Without a target time everything is written
    /// immediately.
    pub fn release_at(mut self, target: SystemTime) -> Self {
        self.target_time = Some(target);
        self
    }

    pub fn tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn method_ref(&self) -> &Method {
        &self.method
    }

    pub fn path_ref(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body_ref(&self) -> &Bytes {
        &self.body
    }

    pub fn target_time(&self) -> Option<SystemTime> {
        self.target_time
    }

    pub fn use_tls(&self) -> bool {
        self.use_tls
    }

    /// Case-insensitive header lookup.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    /// Whether body bytes will be transmitted.
    ///
    /// GET and HEAD requests never carry a body here, even when one was
    /// set on the builder.
    pub fn is_bodied(&self) -> bool {
        !self.body.is_empty() && !matches!(self.method, Method::GET | Method::HEAD)
    }

    /// Value for the default `Host` header: the port is included only when
    /// it is not the default for the scheme.
    pub(crate) fn host_header(&self) -> String {
        match (self.use_tls, self.port) {
            (false, 80) | (true, 443) => self.host.clone(),
            _ => format!("{}:{}", self.host, self.port),
        }
    }
}
